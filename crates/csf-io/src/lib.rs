//! # csf-io
//!
//! Image I/O for the color space fixer.
//!
//! Decodes and encodes the two web raster formats the fixer handles while
//! keeping what the color pipeline needs: the native pixel layout, the
//! container's raster colorspace and the embedded ICC profile bytes. EXIF,
//! PNG text and pixel density ride along in [`Metadata`] so a rewrite does
//! not lose them.
//!
//! - **JPEG** - gray, RGB and CMYK, 8-bit (16-bit gray on read)
//! - **PNG** - gray, gray+alpha, RGB, RGBA at 8 and 16 bits
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use csf_io::{read, write_atomic, EncodeOptions};
//!
//! let image = read("upload.jpg")?;
//! println!("{}x{} {} icc={}", image.width, image.height, image.colorspace, image.icc_profile.is_some());
//!
//! write_atomic("upload.jpg", &image, &EncodeOptions::default())?;
//! ```
//!
//! # Feature Flags
//!
//! - `png` - PNG support (default)
//! - `jpeg` - JPEG support (default)

#![warn(missing_docs)]

mod atomic;
mod colorspace;
mod detect;
mod error;
mod image;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "jpeg")]
pub mod jpeg;

pub use atomic::write_bytes_atomic;
pub use colorspace::Colorspace;
pub use detect::Format;
pub use error::{IoError, IoResult};
pub use image::{merge_alpha, Density, Metadata, PixelData, PixelLayout, RasterImage, TextEntry, TextKind};

use std::path::Path;

/// Encoder settings shared by all formats.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// JPEG quality 1-100. Default: 90.
    pub jpeg_quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

/// Reads an image from a file, detecting the format from its magic bytes.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened
/// - The format is not JPEG or PNG
/// - The file is corrupted
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<RasterImage> {
    let path = path.as_ref();
    let format = Format::detect(path)?;

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::read(path),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read(path),

        other => Err(IoError::UnsupportedFormat(format!(
            "{} ({})",
            other.name(),
            path.display()
        ))),
    }
}

/// Decodes an in-memory image, detecting the format from its magic bytes.
pub fn read_from_memory(data: &[u8]) -> IoResult<RasterImage> {
    match Format::from_bytes(data) {
        #[cfg(feature = "png")]
        Format::Png => png::read_from_memory(data),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read_from_memory(data),

        other => Err(IoError::UnsupportedFormat(other.name().to_string())),
    }
}

/// Encodes an image in its own container format.
pub fn encode(image: &RasterImage, options: &EncodeOptions) -> IoResult<Vec<u8>> {
    image.validate()?;

    match image.format {
        #[cfg(feature = "png")]
        Format::Png => png::encode(image),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::encode(
            image,
            &jpeg::JpegWriterOptions {
                quality: options.jpeg_quality,
            },
        ),

        other => {
            let _ = options;
            Err(IoError::UnsupportedFormat(other.name().to_string()))
        }
    }
}

/// Encodes an image and atomically replaces `path` with the result.
///
/// Encoding happens fully in memory first, so an encoder failure never
/// touches the file on disk.
pub fn write_atomic<P: AsRef<Path>>(path: P, image: &RasterImage, options: &EncodeOptions) -> IoResult<()> {
    let bytes = encode(image, options)?;
    write_bytes_atomic(path.as_ref(), &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(format: Format) -> RasterImage {
        RasterImage::from_u8(format, 8, 8, PixelLayout::Rgb, Colorspace::Srgb, vec![120; 8 * 8 * 3])
    }

    #[test]
    fn test_write_then_read_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        let image = sample(Format::Png).with_icc_profile(vec![1, 2, 3]);

        write_atomic(&path, &image, &EncodeOptions::default()).unwrap();
        let loaded = read(&path).unwrap();
        assert_eq!(loaded.format, Format::Png);
        assert_eq!(loaded.icc_profile, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_format_from_content_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabelled.png");
        write_atomic(&path, &sample(Format::Jpeg), &EncodeOptions::default()).unwrap();

        assert_eq!(read(&path).unwrap().format, Format::Jpeg);
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            read_from_memory(b"GIF89a\x01\x00\x01\x00"),
            Err(IoError::UnsupportedFormat(_))
        ));

        let gif = sample(Format::Gif);
        assert!(matches!(
            encode(&gif, &EncodeOptions::default()),
            Err(IoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_encode_validates_geometry() {
        let mut image = sample(Format::Png);
        image.data = PixelData::U8(vec![0; 5]);
        assert!(matches!(
            encode(&image, &EncodeOptions::default()),
            Err(IoError::DimensionMismatch { .. })
        ));
    }
}
