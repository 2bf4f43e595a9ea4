//! Format detection utilities.
//!
//! Detects image formats from magic bytes, file extensions and MIME types.

use crate::IoResult;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Image container formats the fixer recognizes.
///
/// Only [`Format::Jpeg`] and [`Format::Png`] can be decoded; the others are
/// detected so callers can report what they skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JPEG / JFIF.
    Jpeg,
    /// PNG.
    Png,
    /// TIFF (recognized, not supported).
    Tiff,
    /// WebP (recognized, not supported).
    WebP,
    /// GIF (recognized, not supported).
    Gif,
    /// Unknown format.
    Unknown,
}

impl Format {
    /// Detects format from a file, magic bytes first, extension second.
    pub fn detect<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();

        let mut file = File::open(path)?;
        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header)?;

        let format = Self::from_bytes(&header[..bytes_read]);
        if format != Format::Unknown {
            return Ok(format);
        }
        Ok(Self::from_extension(path))
    }

    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("jpg") | Some("jpeg") | Some("jpe") => Format::Jpeg,
            Some("png") => Format::Png,
            Some("tif") | Some("tiff") => Format::Tiff,
            Some("webp") => Format::WebP,
            Some("gif") => Format::Gif,
            _ => Format::Unknown,
        }
    }

    /// Detects format from raw bytes (magic number check).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        // PNG: 0x89 0x50 0x4E 0x47 0x0D 0x0A 0x1A 0x0A
        if bytes.len() >= 8 && bytes[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Format::Png;
        }

        // JPEG: 0xFF 0xD8 0xFF
        if bytes.len() >= 3 && bytes[0..3] == [0xFF, 0xD8, 0xFF] {
            return Format::Jpeg;
        }

        if bytes.len() >= 4
            && (bytes[0..4] == [0x49, 0x49, 0x2A, 0x00] || bytes[0..4] == [0x4D, 0x4D, 0x00, 0x2A])
        {
            return Format::Tiff;
        }

        if bytes.len() >= 6 && (&bytes[0..6] == b"GIF87a" || &bytes[0..6] == b"GIF89a") {
            return Format::Gif;
        }

        // WebP: RIFF....WEBP
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Format::WebP;
        }

        Format::Unknown
    }

    /// Maps an upload MIME type to a format.
    ///
    /// Parameters after `;` are ignored, matching is case-insensitive.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" => Format::Jpeg,
            "image/png" => Format::Png,
            "image/tiff" => Format::Tiff,
            "image/webp" => Format::WebP,
            "image/gif" => Format::Gif,
            _ => Format::Unknown,
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Jpeg => "image/jpeg",
            Format::Png => "image/png",
            Format::Tiff => "image/tiff",
            Format::WebP => "image/webp",
            Format::Gif => "image/gif",
            Format::Unknown => "application/octet-stream",
        }
    }

    /// Human-readable format name.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Jpeg => "JPEG",
            Format::Png => "PNG",
            Format::Tiff => "TIFF",
            Format::WebP => "WebP",
            Format::Gif => "GIF",
            Format::Unknown => "unknown",
        }
    }

    /// True if this build can decode and encode the format.
    pub fn is_supported(&self) -> bool {
        match self {
            #[cfg(feature = "jpeg")]
            Format::Jpeg => true,
            #[cfg(feature = "png")]
            Format::Png => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        assert_eq!(Format::from_extension("test.png"), Format::Png);
        assert_eq!(Format::from_extension("test.PNG"), Format::Png);
        assert_eq!(Format::from_extension("test.jpg"), Format::Jpeg);
        assert_eq!(Format::from_extension("test.jpeg"), Format::Jpeg);
        assert_eq!(Format::from_extension("test.tiff"), Format::Tiff);
        assert_eq!(Format::from_extension("test.unknown"), Format::Unknown);
    }

    #[test]
    fn test_magic_bytes() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(Format::from_bytes(&png), Format::Png);

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(Format::from_bytes(&jpeg), Format::Jpeg);

        let tiff_le = [0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        assert_eq!(Format::from_bytes(&tiff_le), Format::Tiff);

        assert_eq!(Format::from_bytes(b"GIF89a\x01\x00"), Format::Gif);
        assert_eq!(Format::from_bytes(b"RIFF\0\0\0\0WEBPVP8 "), Format::WebP);

        let unknown = [0x00, 0x00, 0x00, 0x00];
        assert_eq!(Format::from_bytes(&unknown), Format::Unknown);
        assert_eq!(Format::from_bytes(&[]), Format::Unknown);
    }

    #[test]
    fn test_mime() {
        assert_eq!(Format::from_mime("image/jpeg"), Format::Jpeg);
        assert_eq!(Format::from_mime("IMAGE/PNG; charset=binary"), Format::Png);
        assert_eq!(Format::from_mime("image/gif"), Format::Gif);
        assert_eq!(Format::from_mime("application/pdf"), Format::Unknown);
        assert_eq!(Format::Png.mime_type(), "image/png");
    }

    #[test]
    fn test_supported() {
        assert!(Format::Jpeg.is_supported());
        assert!(Format::Png.is_supported());
        assert!(!Format::Gif.is_supported());
        assert!(!Format::Unknown.is_supported());
    }
}
