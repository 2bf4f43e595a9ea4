//! JPEG format support.
//!
//! Decoding keeps the native pixel format (gray, RGB or CMYK) instead of
//! flattening to RGB, because the ICC transform needs the original samples.
//! Embedded `ICC_PROFILE` APP2 chunks are reassembled by the decoder and
//! written back by the encoder, as are the EXIF and XMP APP1 segments.

use crate::{Colorspace, Format, IoError, IoResult, Metadata, PixelData, PixelLayout, RasterImage};
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// Identifier that opens an EXIF APP1 segment.
const EXIF_HEADER: &[u8] = b"Exif\0\0";
/// Namespace that opens an XMP APP1 segment.
const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// Options for writing JPEG files.
#[derive(Debug, Clone)]
pub struct JpegWriterOptions {
    /// Quality level 1-100. Default: 90.
    pub quality: u8,
}

impl Default for JpegWriterOptions {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

/// Reads a JPEG file from disk.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<RasterImage> {
    let file = std::fs::File::open(path.as_ref())?;
    decode(BufReader::new(file))
}

/// Reads a JPEG from a byte slice.
pub fn read_from_memory(data: &[u8]) -> IoResult<RasterImage> {
    decode(Cursor::new(data))
}

fn decode<R: Read>(source: R) -> IoResult<RasterImage> {
    let mut decoder = jpeg_decoder::Decoder::new(source);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;

    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;
    let icc_profile = decoder.icc_profile();
    let exif = decoder.exif_data().map(<[u8]>::to_vec);
    let xmp = decoder.xmp_data().map(<[u8]>::to_vec);

    let (layout, colorspace, data) = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => (PixelLayout::Rgb, Colorspace::Srgb, PixelData::U8(pixels)),
        jpeg_decoder::PixelFormat::L8 => (PixelLayout::Gray, Colorspace::Gray, PixelData::U8(pixels)),
        jpeg_decoder::PixelFormat::L16 => (PixelLayout::Gray, Colorspace::Gray, PixelData::U16(l16_samples(&pixels))),
        jpeg_decoder::PixelFormat::CMYK32 => (PixelLayout::Cmyk, Colorspace::Cmyk, PixelData::U8(pixels)),
    };

    tracing::trace!(
        width = info.width,
        height = info.height,
        pixel_format = ?info.pixel_format,
        icc = icc_profile.as_ref().map(|p| p.len()),
        exif = exif.as_ref().map(|e| e.len()),
        "decoded JPEG"
    );

    Ok(RasterImage {
        width: info.width as u32,
        height: info.height as u32,
        format: Format::Jpeg,
        layout,
        colorspace,
        data,
        icc_profile,
        metadata: Metadata {
            exif,
            xmp,
            ..Metadata::default()
        },
    })
}

/// Rebuilds `L16` output, which jpeg-decoder emits in native byte order.
fn l16_samples(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
        .collect()
}

/// Encodes an image as JPEG, embedding its ICC profile.
///
/// Alpha is dropped and 16-bit samples are narrowed to 8 bits. EXIF and XMP
/// are written back as APP1 segments; PNG-only metadata is dropped.
pub fn encode(image: &RasterImage, options: &JpegWriterOptions) -> IoResult<Vec<u8>> {
    use jpeg_encoder::{ColorType as JpegColorType, Encoder};

    let (width, height) = match (u16::try_from(image.width), u16::try_from(image.height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(IoError::EncodeError(format!(
                "{}x{} exceeds the JPEG size limit",
                image.width, image.height
            )));
        }
    };

    let samples = image.data.to_u8();
    let (color_type, pixel_data) = match image.layout {
        PixelLayout::Gray => (JpegColorType::Luma, samples),
        PixelLayout::Rgb => (JpegColorType::Rgb, samples),
        PixelLayout::Cmyk => (JpegColorType::Cmyk, samples),
        PixelLayout::GrayAlpha => (
            JpegColorType::Luma,
            samples.chunks_exact(2).map(|ga| ga[0]).collect(),
        ),
        PixelLayout::Rgba => (
            JpegColorType::Rgb,
            samples
                .chunks_exact(4)
                .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
                .collect(),
        ),
    };

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, options.quality);
    let app1 = [(EXIF_HEADER, &image.metadata.exif), (XMP_HEADER, &image.metadata.xmp)];
    for (header, payload) in app1 {
        if let Some(payload) = payload {
            encoder
                .add_app_segment(1, &[header, payload.as_slice()].concat())
                .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;
        }
    }
    if let Some(icc) = &image.icc_profile {
        encoder
            .add_icc_profile(icc)
            .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;
    }
    encoder
        .encode(&pixel_data, width, height, color_type)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_image(width: u32, height: u32) -> RasterImage {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 8) as u8);
                data.push((y * 8) as u8);
                data.push(128);
            }
        }
        RasterImage::from_u8(Format::Jpeg, width, height, PixelLayout::Rgb, Colorspace::Srgb, data)
    }

    #[test]
    fn test_rgb_keeps_icc_profile() {
        let icc = vec![7u8; 300];
        let image = rgb_image(32, 32).with_icc_profile(icc.clone());

        let bytes = encode(&image, &JpegWriterOptions::default()).expect("Write failed");
        let loaded = read_from_memory(&bytes).expect("Read failed");

        assert_eq!(loaded.width, 32);
        assert_eq!(loaded.height, 32);
        assert_eq!(loaded.layout, PixelLayout::Rgb);
        assert_eq!(loaded.colorspace, Colorspace::Srgb);
        assert_eq!(loaded.format, Format::Jpeg);
        assert_eq!(loaded.icc_profile, Some(icc));
    }

    #[test]
    fn test_without_profile() {
        let bytes = encode(&rgb_image(16, 16), &JpegWriterOptions::default()).unwrap();
        let loaded = read_from_memory(&bytes).unwrap();
        assert!(loaded.icc_profile.is_none());
    }

    #[test]
    fn test_gray_reports_gray() {
        let image = RasterImage::from_u8(Format::Jpeg, 16, 16, PixelLayout::Gray, Colorspace::Gray, vec![128; 256]);
        let loaded = read_from_memory(&encode(&image, &JpegWriterOptions::default()).unwrap()).unwrap();
        assert_eq!(loaded.layout, PixelLayout::Gray);
        assert_eq!(loaded.colorspace, Colorspace::Gray);
    }

    #[test]
    fn test_cmyk_reports_cmyk() {
        let image = RasterImage::from_u8(Format::Jpeg, 16, 16, PixelLayout::Cmyk, Colorspace::Cmyk, vec![64; 16 * 16 * 4]);
        let loaded = read_from_memory(&encode(&image, &JpegWriterOptions::default()).unwrap()).unwrap();
        assert_eq!(loaded.layout, PixelLayout::Cmyk);
        assert_eq!(loaded.colorspace, Colorspace::Cmyk);
        assert_eq!(loaded.data.len(), 16 * 16 * 4);
    }

    #[test]
    fn test_alpha_dropped() {
        let image = RasterImage::from_u8(Format::Jpeg, 8, 8, PixelLayout::Rgba, Colorspace::Srgb, vec![100; 8 * 8 * 4]);
        let loaded = read_from_memory(&encode(&image, &JpegWriterOptions::default()).unwrap()).unwrap();
        assert_eq!(loaded.layout, PixelLayout::Rgb);
    }

    #[test]
    fn test_l16_native_byte_order() {
        let bytes: Vec<u8> = [0x0100u16, 0xFF00, 0x0001].iter().flat_map(|s| s.to_ne_bytes()).collect();
        assert_eq!(l16_samples(&bytes), vec![0x0100, 0xFF00, 0x0001]);
    }

    #[test]
    fn test_exif_survives_rewrite() {
        // Little-endian TIFF header, one IFD entry: Orientation = 6.
        let exif = vec![
            b'I', b'I', 42, 0, 8, 0, 0, 0, 1, 0, 0x12, 0x01, 3, 0, 1, 0, 0, 0, 6, 0, 0, 0, 0, 0, 0, 0,
        ];
        let image = rgb_image(16, 16).with_icc_profile(vec![9; 64]).with_exif(exif.clone());

        let loaded = read_from_memory(&encode(&image, &JpegWriterOptions::default()).unwrap()).unwrap();
        assert_eq!(loaded.metadata.exif, Some(exif));
        assert_eq!(loaded.icc_profile, Some(vec![9; 64]));

        let mut tagged = rgb_image(16, 16);
        tagged.metadata.xmp = Some(b"<x:xmpmeta/>".to_vec());
        let loaded = read_from_memory(&encode(&tagged, &JpegWriterOptions::default()).unwrap()).unwrap();
        assert_eq!(loaded.metadata.xmp.as_deref(), Some(&b"<x:xmpmeta/>"[..]));

        let plain = read_from_memory(&encode(&rgb_image(16, 16), &JpegWriterOptions::default()).unwrap()).unwrap();
        assert!(plain.metadata.is_empty());
    }

    #[test]
    fn test_quality_options() {
        let image = rgb_image(16, 16);
        let low = encode(&image, &JpegWriterOptions { quality: 50 }).unwrap();
        let high = encode(&image, &JpegWriterOptions { quality: 99 }).unwrap();
        assert!(high.len() >= low.len());
    }
}
