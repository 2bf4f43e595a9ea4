//! Outcome record persisted by the caller as image metadata.

use crate::ColorProfileInfo;
use csf_io::Colorspace;
use serde::{Deserialize, Serialize};

/// What happened to one image's color data.
///
/// The `converted_*` fields are only present when `converted` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    converted: bool,
    original_colorspace: Colorspace,
    original_icc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    converted_colorspace: Option<Colorspace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    converted_icc: Option<String>,
}

impl ConversionOutcome {
    /// Record for an image that was left as is.
    pub fn unconverted(info: &ColorProfileInfo) -> Self {
        Self {
            converted: false,
            original_colorspace: info.colorspace(),
            original_icc: info.description().map(String::from),
            converted_colorspace: None,
            converted_icc: None,
        }
    }

    /// Record for an image that was rewritten.
    pub fn converted(info: &ColorProfileInfo, colorspace: Colorspace, icc_description: impl Into<String>) -> Self {
        Self {
            converted: true,
            converted_colorspace: Some(colorspace),
            converted_icc: Some(icc_description.into()),
            ..Self::unconverted(info)
        }
    }

    /// True if new pixel data was written.
    pub fn is_converted(&self) -> bool {
        self.converted
    }

    /// Raster colorspace before processing.
    pub fn original_colorspace(&self) -> Colorspace {
        self.original_colorspace
    }

    /// Profile description before processing.
    pub fn original_icc(&self) -> Option<&str> {
        self.original_icc.as_deref()
    }

    /// Raster colorspace written, if converted.
    pub fn converted_colorspace(&self) -> Option<Colorspace> {
        self.converted_colorspace
    }

    /// Profile description embedded, if converted.
    pub fn converted_icc(&self) -> Option<&str> {
        self.converted_icc.as_deref()
    }
}
