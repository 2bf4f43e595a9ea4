//! Error taxonomy of the fixer pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for pipeline operations.
pub type FixResult<T> = Result<T, FixError>;

/// Failure of one pipeline stage.
///
/// Library errors ([`csf_io::IoError`], [`csf_icc::IccError`]) are mapped
/// into these explicitly at the stage where they occur, so the same
/// underlying error can become `Decode` on load and `Write` on store.
#[derive(Debug, Error)]
pub enum FixError {
    /// Image could not be opened or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Input is not a JPEG or PNG image.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Color management is unavailable in this process.
    #[error("color management unavailable: {0}")]
    MissingCapability(String),

    /// Profile application or pixel conversion failed.
    #[error("transform error: {0}")]
    Transform(String),

    /// Converted image could not be encoded or persisted.
    #[error("write error: {0}")]
    Write(String),
}

impl FixError {
    /// Serializable tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FixError::Decode(_) => ErrorKind::Decode,
            FixError::UnsupportedMediaType(_) => ErrorKind::UnsupportedMediaType,
            FixError::MissingCapability(_) => ErrorKind::MissingCapability,
            FixError::Transform(_) => ErrorKind::Transform,
            FixError::Write(_) => ErrorKind::Write,
        }
    }

    /// True for failures scoped to a single image.
    ///
    /// A batch records these against the image and moves on.
    /// `MissingCapability` is process-wide and `UnsupportedMediaType` is a
    /// caller-side skip.
    pub fn is_per_image(&self) -> bool {
        self.kind().is_per_image()
    }
}

/// Tag identifying a [`FixError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`FixError::Decode`].
    Decode,
    /// See [`FixError::UnsupportedMediaType`].
    UnsupportedMediaType,
    /// See [`FixError::MissingCapability`].
    MissingCapability,
    /// See [`FixError::Transform`].
    Transform,
    /// See [`FixError::Write`].
    Write,
}

impl ErrorKind {
    /// See [`FixError::is_per_image`].
    pub fn is_per_image(self) -> bool {
        matches!(self, ErrorKind::Decode | ErrorKind::Transform | ErrorKind::Write)
    }

    /// Snake-case name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::UnsupportedMediaType => "unsupported_media_type",
            ErrorKind::MissingCapability => "missing_capability",
            ErrorKind::Transform => "transform",
            ErrorKind::Write => "write",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_image_split() {
        assert!(FixError::Decode("x".into()).is_per_image());
        assert!(FixError::Transform("x".into()).is_per_image());
        assert!(FixError::Write("x".into()).is_per_image());
        assert!(!FixError::MissingCapability("x".into()).is_per_image());
        assert!(!FixError::UnsupportedMediaType("x".into()).is_per_image());
    }

    #[test]
    fn test_kind_serializes_like_display() {
        let kind = FixError::UnsupportedMediaType("image/gif".into()).kind();
        assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{}\"", kind));
    }
}
