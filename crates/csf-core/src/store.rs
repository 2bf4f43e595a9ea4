//! Access to stored images.

use crate::{FixError, FixResult, ImageHandle};
use csf_io::{EncodeOptions, Format, IoError, RasterImage};
use std::path::Path;

/// Loads images for inspection and persists converted ones.
///
/// `store` must replace the target atomically: on error the previous bytes
/// stay in place.
pub trait ImageStore: Send + Sync {
    /// Decodes the image at `path`.
    ///
    /// Fails with [`FixError::UnsupportedMediaType`] for anything other than
    /// JPEG or PNG and [`FixError::Decode`] for unreadable data.
    fn load(&self, path: &Path) -> FixResult<ImageHandle>;

    /// Encodes `image` in its own format and replaces `path` with it.
    fn store(&self, path: &Path, image: &RasterImage) -> FixResult<()>;
}

/// Filesystem store backed by `csf-io`.
#[derive(Debug, Clone, Default)]
pub struct FsStore {
    options: EncodeOptions,
}

impl FsStore {
    /// Creates a store with default encoder settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the JPEG quality used when re-encoding.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.options.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

impl ImageStore for FsStore {
    fn load(&self, path: &Path) -> FixResult<ImageHandle> {
        let format = Format::detect(path).map_err(|e| FixError::Decode(format!("{}: {}", path.display(), e)))?;
        if !format.is_supported() {
            return Err(FixError::UnsupportedMediaType(format!(
                "{}: {}",
                path.display(),
                format.name()
            )));
        }

        let image = csf_io::read(path).map_err(|e| match e {
            IoError::UnsupportedFormat(msg) => FixError::UnsupportedMediaType(msg),
            other => FixError::Decode(format!("{}: {}", path.display(), other)),
        })?;
        Ok(ImageHandle::new(path, image))
    }

    fn store(&self, path: &Path, image: &RasterImage) -> FixResult<()> {
        csf_io::write_atomic(path, image, &self.options)
            .map_err(|e| FixError::Write(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csf_io::{Colorspace, PixelLayout};

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        let image = RasterImage::from_u8(Format::Png, 2, 2, PixelLayout::Rgb, Colorspace::Srgb, vec![9; 12]);

        let store = FsStore::new();
        store.store(&path, &image).unwrap();
        let handle = store.load(&path).unwrap();
        assert_eq!(handle.image().data, image.data);
        assert_eq!(handle.path(), path.as_path());
    }

    #[test]
    fn test_unsupported_media() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.gif");
        std::fs::write(&path, b"GIF89a\x01\x00\x01\x00").unwrap();
        assert!(matches!(FsStore::new().load(&path), Err(FixError::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_corrupt_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).unwrap();
        assert!(matches!(FsStore::new().load(&path), Err(FixError::Decode(_))));

        let missing = dir.path().join("missing.png");
        assert!(matches!(FsStore::new().load(&missing), Err(FixError::Decode(_))));
    }

    #[test]
    fn test_store_failure_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("a.png");
        let image = RasterImage::from_u8(Format::Png, 1, 1, PixelLayout::Rgb, Colorspace::Srgb, vec![0; 3]);
        assert!(matches!(FsStore::new().store(&path, &image), Err(FixError::Write(_))));
    }
}
