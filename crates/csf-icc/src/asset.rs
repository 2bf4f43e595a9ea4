//! The canonical sRGB profile embedded into every converted image.

use crate::{ColorModel, IccError, IccResult, Profile};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a [`SrgbAsset`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOrigin {
    /// lcms2's built-in sRGB profile.
    Builtin,
    /// An `.icc` file on disk (e.g. `sRGB2014.icc`).
    File(PathBuf),
}

/// Canonical sRGB ICC profile bytes.
///
/// Loaded once at startup and shared by every conversion. The bytes are kept
/// rather than a parsed [`Profile`] so the asset can be cloned across threads
/// cheaply; each conversion parses its own handle.
#[derive(Debug, Clone)]
pub struct SrgbAsset {
    bytes: Arc<[u8]>,
    description: String,
    origin: AssetOrigin,
}

impl SrgbAsset {
    /// Serializes lcms2's built-in sRGB profile.
    pub fn builtin() -> IccResult<Self> {
        let bytes = Profile::srgb().to_icc()?;
        Self::from_bytes(bytes, AssetOrigin::Builtin)
    }

    /// Loads the profile from an `.icc` file.
    pub fn from_file(path: impl AsRef<Path>) -> IccResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| IccError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(bytes, AssetOrigin::File(path.to_path_buf()))
    }

    /// Validates raw ICC bytes as an RGB profile with a description.
    pub fn from_bytes(bytes: Vec<u8>, origin: AssetOrigin) -> IccResult<Self> {
        let profile = Profile::from_icc(&bytes)?;
        if profile.color_model() != Some(ColorModel::Rgb) {
            return Err(IccError::ColorSpaceMismatch {
                expected: "Rgb".into(),
                actual: profile.color_space(),
            });
        }
        let description = profile
            .description()
            .ok_or_else(|| IccError::InvalidProfile("sRGB asset has no description".into()))?;

        tracing::debug!(%description, ?origin, size = bytes.len(), "loaded sRGB asset");
        Ok(Self {
            bytes: bytes.into(),
            description,
            origin,
        })
    }

    /// Raw ICC bytes, ready to embed.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Profile description as embedded in the bytes.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Where the asset came from.
    pub fn origin(&self) -> &AssetOrigin {
        &self.origin
    }

    /// Parses a fresh profile handle for one transform.
    pub fn profile(&self) -> IccResult<Profile> {
        Profile::from_icc(&self.bytes)
    }
}
