//! Raster colorspace labels reported by the decoders.
//!
//! This is the pixel encoding model as the container declares it, not the
//! finer color definition carried by an embedded ICC profile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raster colorspace of decoded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Colorspace {
    /// Decoder did not report a colorspace.
    Undefined,
    /// Linear RGB.
    Rgb,
    /// Gamma-encoded sRGB; the default for RGB JPEG and PNG data.
    Srgb,
    /// Linear extended-range sRGB.
    #[serde(rename = "SCRGB")]
    ScRgb,
    /// Gamma-encoded grayscale.
    Gray,
    /// Linear grayscale.
    #[serde(rename = "LINEARGRAY")]
    LinearGray,
    /// Cyan, magenta, yellow, black.
    Cmyk,
    /// Cyan, magenta, yellow.
    Cmy,
    /// CIE L*a*b*.
    Lab,
    /// CIE XYZ.
    Xyz,
    /// Luma plus chroma differences.
    #[serde(rename = "YCBCR")]
    YCbCr,
}

/// Display names, one row per variant.
const NAMES: [(Colorspace, &str); 11] = [
    (Colorspace::Undefined, "Undefined"),
    (Colorspace::Rgb, "RGB"),
    (Colorspace::Srgb, "sRGB"),
    (Colorspace::ScRgb, "scRGB"),
    (Colorspace::Gray, "Gray"),
    (Colorspace::LinearGray, "LinearGray"),
    (Colorspace::Cmyk, "CMYK"),
    (Colorspace::Cmy, "CMY"),
    (Colorspace::Lab, "Lab"),
    (Colorspace::Xyz, "XYZ"),
    (Colorspace::YCbCr, "YCbCr"),
];

impl Colorspace {
    /// Every known colorspace.
    pub fn all() -> impl Iterator<Item = Colorspace> {
        NAMES.iter().map(|(cs, _)| *cs)
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(cs, _)| *cs == self)
            .map(|(_, name)| *name)
            .unwrap_or("Undefined")
    }
}

impl fmt::Display for Colorspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colorspace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(cs, _)| *cs)
            .ok_or_else(|| format!("unknown colorspace: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for cs in Colorspace::all() {
            assert_eq!(cs.name().parse::<Colorspace>().unwrap(), cs);
        }
        assert_eq!(Colorspace::all().count(), NAMES.len());
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("SRGB".parse::<Colorspace>().unwrap(), Colorspace::Srgb);
        assert_eq!("cmyk".parse::<Colorspace>().unwrap(), Colorspace::Cmyk);
        assert!("HSL".parse::<Colorspace>().is_err());
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(serde_json::to_string(&Colorspace::Srgb).unwrap(), "\"SRGB\"");
        assert_eq!(serde_json::to_string(&Colorspace::Cmyk).unwrap(), "\"CMYK\"");
        assert_eq!(serde_json::to_string(&Colorspace::Gray).unwrap(), "\"GRAY\"");
    }

    #[test]
    fn test_serde_labels_match_names() {
        for cs in Colorspace::all() {
            let json = serde_json::to_string(&cs).unwrap();
            let label = json.trim_matches('"');
            assert_eq!(label, cs.name().to_uppercase(), "{:?}", cs);
            assert_eq!(label.parse::<Colorspace>().unwrap(), cs);
            assert_eq!(serde_json::from_str::<Colorspace>(&json).unwrap(), cs);
        }
    }
}
