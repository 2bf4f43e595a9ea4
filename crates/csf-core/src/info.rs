//! Profile inspection.

use crate::{FixError, FixResult, FsStore, ImageStore};
use csf_icc::Profile;
use csf_io::{Colorspace, RasterImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Color metadata of one decoded image, as the policy sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorProfileInfo {
    colorspace: Colorspace,
    has_icc_profile: bool,
    icc_description: Option<String>,
}

impl ColorProfileInfo {
    /// Creates a new info record.
    ///
    /// Empty or whitespace-only descriptions are stored as `None`.
    pub fn new(colorspace: Colorspace, has_icc_profile: bool, icc_description: Option<String>) -> Self {
        let icc_description = icc_description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Self {
            colorspace,
            has_icc_profile,
            icc_description,
        }
    }

    /// Raster colorspace reported by the decoder.
    pub fn colorspace(&self) -> Colorspace {
        self.colorspace
    }

    /// True if the image embeds an ICC profile.
    pub fn has_icc_profile(&self) -> bool {
        self.has_icc_profile
    }

    /// Profile description. Always `None` when there is no profile.
    pub fn description(&self) -> Option<&str> {
        if self.has_icc_profile {
            self.icc_description.as_deref()
        } else {
            None
        }
    }
}

/// A decoded image and the path it came from.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    path: PathBuf,
    image: RasterImage,
}

impl ImageHandle {
    /// Wraps an already decoded image.
    pub fn new(path: impl Into<PathBuf>, image: RasterImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    /// Decodes `path` from the filesystem.
    pub fn open(path: impl AsRef<Path>) -> FixResult<Self> {
        FsStore::new().load(path.as_ref())
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decoded raster.
    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Consumes the handle, returning the raster.
    pub fn into_image(self) -> RasterImage {
        self.image
    }
}

/// Reads colorspace, profile presence and profile description.
///
/// A profile that is embedded but cannot be parsed counts as present with no
/// description.
///
/// # Errors
///
/// [`FixError::Decode`] when the pixel buffer does not match the image
/// geometry.
pub fn inspect(handle: &ImageHandle) -> FixResult<ColorProfileInfo> {
    let image = handle.image();
    image
        .validate()
        .map_err(|e| FixError::Decode(format!("{}: {}", handle.path().display(), e)))?;

    let description = image.icc_profile.as_deref().and_then(|bytes| match Profile::from_icc(bytes) {
        Ok(profile) => profile.description(),
        Err(e) => {
            tracing::warn!(path = %handle.path().display(), error = %e, "embedded ICC profile is unreadable");
            None
        }
    });

    let info = ColorProfileInfo::new(image.colorspace, image.icc_profile.is_some(), description);
    tracing::debug!(
        path = %handle.path().display(),
        colorspace = info.colorspace().name(),
        icc = info.has_icc_profile(),
        description = info.description().unwrap_or("-"),
        "inspected image"
    );
    Ok(info)
}
