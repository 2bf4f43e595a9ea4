//! Decoded raster image.

use crate::{Colorspace, Format, IoError, IoResult};

/// Channel arrangement of interleaved pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// Gray.
    Gray,
    /// Gray + alpha.
    GrayAlpha,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Cyan, magenta, yellow, black.
    Cmyk,
}

impl PixelLayout {
    /// Total channels per pixel.
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Gray => 1,
            PixelLayout::GrayAlpha => 2,
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba | PixelLayout::Cmyk => 4,
        }
    }

    /// True if the last channel is alpha.
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelLayout::GrayAlpha | PixelLayout::Rgba)
    }
}

/// Pixel storage.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// 8-bit samples.
    U8(Vec<u8>),
    /// 16-bit samples, native endian.
    U16(Vec<u16>),
}

impl PixelData {
    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(v) => v.len(),
            PixelData::U16(v) => v.len(),
        }
    }

    /// True if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bits per sample.
    pub fn bits(&self) -> u8 {
        match self {
            PixelData::U8(_) => 8,
            PixelData::U16(_) => 16,
        }
    }

    /// Samples narrowed to 8 bits (high byte of 16-bit data).
    pub fn to_u8(&self) -> Vec<u8> {
        match self {
            PixelData::U8(v) => v.clone(),
            PixelData::U16(v) => v.iter().map(|&s| (s >> 8) as u8).collect(),
        }
    }
}

/// PNG text chunk flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// `tEXt`: uncompressed Latin-1.
    Latin1,
    /// `zTXt`: compressed Latin-1.
    CompressedLatin1,
    /// `iTXt`: UTF-8.
    Utf8,
}

/// A keyword/value text entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    /// Chunk the entry came from.
    pub kind: TextKind,
    /// Keyword, e.g. `Author` or `Software`.
    pub keyword: String,
    /// Value.
    pub text: String,
}

/// Physical pixel density (PNG `pHYs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Density {
    /// Pixels per unit along x.
    pub x: u32,
    /// Pixels per unit along y.
    pub y: u32,
    /// Unit is the meter; otherwise only the aspect ratio is meaningful.
    pub per_meter: bool,
}

/// Non-pixel metadata carried through a rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Raw EXIF, starting at the TIFF header (no `Exif\0\0` prefix).
    pub exif: Option<Vec<u8>>,
    /// JPEG XMP packet (without the namespace header).
    pub xmp: Option<Vec<u8>>,
    /// PNG text chunks.
    pub text: Vec<TextEntry>,
    /// PNG pixel density.
    pub density: Option<Density>,
}

impl Metadata {
    /// True if nothing is carried.
    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.xmp.is_none() && self.text.is_empty() && self.density.is_none()
    }
}

/// A decoded JPEG or PNG image together with the color metadata the fixer
/// cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container the image was decoded from (and will be encoded to).
    pub format: Format,
    /// Channel arrangement.
    pub layout: PixelLayout,
    /// Raster colorspace reported by the decoder.
    pub colorspace: Colorspace,
    /// Interleaved samples.
    pub data: PixelData,
    /// Embedded ICC profile bytes, if any.
    pub icc_profile: Option<Vec<u8>>,
    /// EXIF and other container metadata preserved on re-encode.
    pub metadata: Metadata,
}

impl RasterImage {
    /// Builds an 8-bit image without an ICC profile.
    pub fn from_u8(
        format: Format,
        width: u32,
        height: u32,
        layout: PixelLayout,
        colorspace: Colorspace,
        data: Vec<u8>,
    ) -> Self {
        Self {
            width,
            height,
            format,
            layout,
            colorspace,
            data: PixelData::U8(data),
            icc_profile: None,
            metadata: Metadata::default(),
        }
    }

    /// Attaches ICC profile bytes.
    pub fn with_icc_profile(mut self, icc: Vec<u8>) -> Self {
        self.icc_profile = Some(icc);
        self
    }

    /// Attaches raw EXIF (TIFF header onwards).
    pub fn with_exif(mut self, exif: Vec<u8>) -> Self {
        self.metadata.exif = Some(exif);
        self
    }

    /// Number of samples the geometry requires.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.layout.channels()
    }

    /// Checks the pixel buffer against the declared geometry.
    pub fn validate(&self) -> IoResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(IoError::DimensionMismatch {
                expected: "non-empty image".into(),
                actual: format!("{}x{}", self.width, self.height),
            });
        }
        if self.data.len() != self.expected_len() {
            return Err(IoError::DimensionMismatch {
                expected: format!(
                    "{} samples ({}x{}x{})",
                    self.expected_len(),
                    self.width,
                    self.height,
                    self.layout.channels()
                ),
                actual: format!("{} samples", self.data.len()),
            });
        }
        Ok(())
    }

    /// Splits interleaved data into color samples and alpha samples.
    ///
    /// The alpha half is `None` for layouts without alpha.
    pub fn split_alpha(&self) -> (PixelData, Option<PixelData>) {
        if !self.layout.has_alpha() {
            return (self.data.clone(), None);
        }
        let stride = self.layout.channels();
        match &self.data {
            PixelData::U8(v) => {
                let (color, alpha) = split(v, stride);
                (PixelData::U8(color), Some(PixelData::U8(alpha)))
            }
            PixelData::U16(v) => {
                let (color, alpha) = split(v, stride);
                (PixelData::U16(color), Some(PixelData::U16(alpha)))
            }
        }
    }
}

fn split<T: Copy>(samples: &[T], stride: usize) -> (Vec<T>, Vec<T>) {
    let pixels = samples.len() / stride;
    let mut color = Vec::with_capacity(pixels * (stride - 1));
    let mut alpha = Vec::with_capacity(pixels);
    for px in samples.chunks_exact(stride) {
        color.extend_from_slice(&px[..stride - 1]);
        alpha.push(px[stride - 1]);
    }
    (color, alpha)
}

/// Interleaves RGB samples with an alpha plane.
pub fn merge_alpha<T: Copy>(rgb: &[T], alpha: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(rgb.len() + alpha.len());
    for (px, a) in rgb.chunks_exact(3).zip(alpha) {
        out.extend_from_slice(px);
        out.push(*a);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let ok = RasterImage::from_u8(Format::Png, 2, 2, PixelLayout::Rgb, Colorspace::Srgb, vec![0; 12]);
        assert!(ok.validate().is_ok());

        let short = RasterImage::from_u8(Format::Png, 2, 2, PixelLayout::Rgba, Colorspace::Srgb, vec![0; 12]);
        assert!(matches!(short.validate(), Err(IoError::DimensionMismatch { .. })));

        let empty = RasterImage::from_u8(Format::Png, 0, 2, PixelLayout::Rgb, Colorspace::Srgb, vec![]);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_split_and_merge_alpha() {
        let image = RasterImage::from_u8(
            Format::Png,
            2,
            1,
            PixelLayout::Rgba,
            Colorspace::Srgb,
            vec![1, 2, 3, 10, 4, 5, 6, 20],
        );
        let (color, alpha) = image.split_alpha();
        assert_eq!(color, PixelData::U8(vec![1, 2, 3, 4, 5, 6]));
        assert_eq!(alpha, Some(PixelData::U8(vec![10, 20])));

        assert_eq!(merge_alpha(&[1, 2, 3, 4, 5, 6], &[10, 20]), vec![1, 2, 3, 10, 4, 5, 6, 20]);
    }

    #[test]
    fn test_gray_alpha_split() {
        let image = RasterImage::from_u8(Format::Png, 2, 1, PixelLayout::GrayAlpha, Colorspace::Gray, vec![7, 255, 9, 0]);
        let (color, alpha) = image.split_alpha();
        assert_eq!(color, PixelData::U8(vec![7, 9]));
        assert_eq!(alpha, Some(PixelData::U8(vec![255, 0])));
    }

    #[test]
    fn test_to_u8_narrows() {
        assert_eq!(PixelData::U16(vec![0xABCD, 0x00FF]).to_u8(), vec![0xAB, 0x00]);
    }
}
