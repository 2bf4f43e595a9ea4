//! # csf-icc
//!
//! ICC color profile support for the color space fixer.
//!
//! This crate wraps Little CMS 2 with the handful of operations needed to
//! normalize uploaded images to sRGB:
//!
//! - Parse embedded ICC profiles and read their description
//! - Build gray/RGB/CMYK → RGB transforms at 8 or 16 bits per sample
//! - Hold the canonical sRGB profile ([`SrgbAsset`]) that converted images embed
//! - Probe whether color management works at all ([`probe`])
//!
//! # Example
//!
//! ```rust
//! use csf_icc::{ColorModel, Intent, Profile, SampleDepth, SrgbAsset, Transform};
//!
//! let asset = SrgbAsset::builtin().unwrap();
//! let source = Profile::adobe_rgb().unwrap();
//! let dest = asset.profile().unwrap();
//!
//! let t = Transform::to_rgb(&source, ColorModel::Rgb, SampleDepth::Eight, &dest, Intent::Perceptual).unwrap();
//! let out = t.apply_u8(&[10, 200, 30]).unwrap();
//! assert_eq!(out.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod asset;
mod error;
mod profile;
mod standard;
mod transform;

pub use asset::{AssetOrigin, SrgbAsset};
pub use error::{IccError, IccResult};
pub use profile::Profile;
pub use standard::StandardProfile;
pub use transform::{SampleDepth, Transform};

use std::str::FromStr;

/// Color model of a profile's data space, and of the pixels fed to a
/// [`Transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    /// Single gray channel.
    Gray,
    /// Red, green, blue.
    Rgb,
    /// Cyan, magenta, yellow, black.
    Cmyk,
}

/// Rendering intent for color transformations.
///
/// Determines how out-of-gamut colors are handled during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    /// Compresses the whole source gamut into the destination.
    ///
    /// Best for photographic images.
    #[default]
    Perceptual,

    /// Maps white to white and clips out-of-gamut colors.
    RelativeColorimetric,

    /// Maintains saturation at the expense of accuracy.
    Saturation,

    /// Like relative colorimetric but without white point adaptation.
    AbsoluteColorimetric,
}

impl From<Intent> for lcms2::Intent {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Perceptual => lcms2::Intent::Perceptual,
            Intent::RelativeColorimetric => lcms2::Intent::RelativeColorimetric,
            Intent::Saturation => lcms2::Intent::Saturation,
            Intent::AbsoluteColorimetric => lcms2::Intent::AbsoluteColorimetric,
        }
    }
}

impl FromStr for Intent {
    type Err = IccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "perceptual" => Ok(Intent::Perceptual),
            "relative" | "relative-colorimetric" => Ok(Intent::RelativeColorimetric),
            "saturation" => Ok(Intent::Saturation),
            "absolute" | "absolute-colorimetric" => Ok(Intent::AbsoluteColorimetric),
            other => Err(IccError::InvalidProfile(format!("unknown rendering intent: {}", other))),
        }
    }
}

/// Checks that the color management engine can build and run transforms.
///
/// Runs an sRGB → sRGB and a gray → sRGB transform on a single pixel. Callers
/// check this once at startup and disable conversion if it fails.
pub fn probe() -> IccResult<()> {
    let srgb = Profile::srgb();
    let rgb = Transform::to_rgb(&srgb, ColorModel::Rgb, SampleDepth::Eight, &srgb, Intent::Perceptual)?;
    rgb.apply_u8(&[128, 128, 128])?;

    let gray = Profile::gray(2.2)?;
    let gray = Transform::to_rgb(&gray, ColorModel::Gray, SampleDepth::Eight, &srgb, Intent::Perceptual)?;
    gray.apply_u8(&[128])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe() {
        probe().unwrap();
    }

    #[test]
    fn test_intent_parse() {
        assert_eq!("relative".parse::<Intent>().unwrap(), Intent::RelativeColorimetric);
        assert_eq!("Perceptual".parse::<Intent>().unwrap(), Intent::Perceptual);
        assert!("vivid".parse::<Intent>().is_err());
    }
}
