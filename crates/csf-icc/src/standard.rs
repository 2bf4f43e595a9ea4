//! Standard wide-gamut RGB profiles.
//!
//! Mostly useful for producing source profiles other than sRGB, e.g. to tag
//! test images the way a camera or Photoshop would.

use crate::{IccError, IccResult, Profile};
use lcms2::{CIExyY, CIExyYTRIPLE, Profile as LcmsProfile, ToneCurve};

/// Standard RGB color spaces wider than sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardProfile {
    /// Adobe RGB (1998).
    AdobeRgb,
    /// Display P3 (Apple).
    DisplayP3,
}

impl StandardProfile {
    /// Creates an ICC profile from this standard.
    pub fn to_profile(self) -> IccResult<Profile> {
        let primaries = match self {
            StandardProfile::AdobeRgb => CIExyYTRIPLE {
                Red: xy(0.6400, 0.3300),
                Green: xy(0.2100, 0.7100),
                Blue: xy(0.1500, 0.0600),
            },
            StandardProfile::DisplayP3 => CIExyYTRIPLE {
                Red: xy(0.680, 0.320),
                Green: xy(0.265, 0.690),
                Blue: xy(0.150, 0.060),
            },
        };

        // sRGB transfer function approximated with a pure 2.2 gamma
        let curve = ToneCurve::new(2.2);
        let curves = [&curve, &curve, &curve];
        let inner = LcmsProfile::new_rgb(&xy(0.3127, 0.3290), &primaries, &curves)
            .map_err(|e| IccError::CreateFailed(format!("{:?}: {}", self, e)))?;
        Ok(Profile { inner })
    }
}

fn xy(x: f64, y: f64) -> CIExyY {
    CIExyY { x, y, Y: 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColorModel;

    #[test]
    fn test_standards_are_rgb_and_not_srgb() {
        for std in [StandardProfile::AdobeRgb, StandardProfile::DisplayP3] {
            let profile = std.to_profile().unwrap();
            assert_eq!(profile.color_model(), Some(ColorModel::Rgb), "{:?} should be RGB", std);
            let desc = profile.description().unwrap_or_default().to_lowercase();
            assert!(!desc.contains("srgb"), "{:?} described as {}", std, desc);
        }
    }
}
