//! ICC profile wrapper.

use crate::{ColorModel, IccError, IccResult, StandardProfile};
use lcms2::{ColorSpaceSignature, Profile as LcmsProfile};

/// An ICC color profile.
///
/// Profiles are parsed from the raw bytes embedded in an image or generated
/// from a [`StandardProfile`].
///
/// # Example
///
/// ```rust
/// use csf_icc::Profile;
///
/// let srgb = Profile::srgb();
/// assert!(srgb.description().unwrap().contains("sRGB"));
/// ```
pub struct Profile {
    /// Internal lcms2 profile handle.
    pub(crate) inner: LcmsProfile,
}

impl Profile {
    /// Parses a profile from raw ICC data, e.g. the bytes embedded in a JPEG
    /// `APP2` segment or a PNG `iCCP` chunk.
    pub fn from_icc(data: &[u8]) -> IccResult<Self> {
        let inner = LcmsProfile::new_icc(data)
            .map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Creates the lcms2 built-in sRGB (IEC 61966-2-1) profile.
    pub fn srgb() -> Self {
        Self {
            inner: LcmsProfile::new_srgb(),
        }
    }

    /// Creates a profile from a standard specification.
    pub fn from_standard(standard: StandardProfile) -> IccResult<Self> {
        standard.to_profile()
    }

    /// Creates an Adobe RGB (1998) profile.
    pub fn adobe_rgb() -> IccResult<Self> {
        Self::from_standard(StandardProfile::AdobeRgb)
    }

    /// Creates a grayscale profile with the specified gamma.
    pub fn gray(gamma: f64) -> IccResult<Self> {
        let curve = lcms2::ToneCurve::new(gamma);
        let inner = LcmsProfile::new_gray(&lcms2::CIExyY::d50(), &curve)
            .map_err(|e| IccError::CreateFailed(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Returns the profile description (`desc` tag).
    ///
    /// `None` when the tag is missing or empty.
    pub fn description(&self) -> Option<String> {
        self.inner
            .info(lcms2::InfoType::Description, lcms2::Locale::none())
            .map(|s| s.trim_end_matches('\0').trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Returns the color model of the profile's data space, if it is one the
    /// transform layer handles.
    pub fn color_model(&self) -> Option<ColorModel> {
        match self.inner.color_space() {
            ColorSpaceSignature::RgbData => Some(ColorModel::Rgb),
            ColorSpaceSignature::CmykData => Some(ColorModel::Cmyk),
            ColorSpaceSignature::GrayData => Some(ColorModel::Gray),
            _ => None,
        }
    }

    /// Returns the raw data space signature as a debug string.
    pub fn color_space(&self) -> String {
        format!("{:?}", self.inner.color_space())
    }

    /// Serializes the profile as ICC data.
    pub fn to_icc(&self) -> IccResult<Vec<u8>> {
        self.inner
            .icc()
            .map_err(|e| IccError::CreateFailed(e.to_string()))
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("description", &self.description())
            .field("color_space", &self.color_space())
            .finish()
    }
}
