//! Process-wide availability of color management.

use crate::{FixError, FixResult};

/// Standing warning shown while conversion is unavailable.
pub const NOTICE: &str = "Color space fixer: color management (Little CMS) is not working in this process. \
Uploaded images will not be converted to sRGB.";

/// Whether ICC transforms work in this process.
///
/// Probe once at startup; the answer does not change for the process
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Transforms work.
    Available,
    /// Transforms fail; the message says why.
    Missing(String),
}

impl Capability {
    /// Runs a trial sRGB → sRGB and gray → sRGB transform.
    pub fn probe() -> Self {
        match csf_icc::probe() {
            Ok(()) => {
                tracing::debug!("color management available");
                Capability::Available
            }
            Err(e) => {
                tracing::warn!(error = %e, "color management unavailable");
                Capability::Missing(e.to_string())
            }
        }
    }

    /// True if conversions can run.
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available)
    }

    /// Turns a missing capability into [`FixError::MissingCapability`].
    pub fn require(&self) -> FixResult<()> {
        match self {
            Capability::Available => Ok(()),
            Capability::Missing(reason) => Err(FixError::MissingCapability(reason.clone())),
        }
    }

    /// Warning to surface once, or `None` when everything works.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Capability::Available => None,
            Capability::Missing(_) => Some(NOTICE),
        }
    }
}
