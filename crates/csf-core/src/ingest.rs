//! Upload hook: decides whether the pipeline runs for a new upload.

use crate::{Capability, Converter, FixError, FixResult, FsStore, ImageStore, IngestConfig, Pipeline, Report};
use csf_io::Format;
use std::fmt;
use std::path::PathBuf;

/// A freshly uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Where the upload was stored.
    pub path: PathBuf,
    /// MIME type declared by the uploader.
    pub mime: String,
}

impl Upload {
    /// Creates an upload record.
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: mime.into(),
        }
    }
}

/// Why an upload was not processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `auto_process` is off.
    Disabled,
    /// MIME type is not JPEG or PNG.
    UnsupportedMediaType(String),
    /// Color management is unavailable.
    MissingCapability,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => f.write_str("automatic processing disabled"),
            SkipReason::UnsupportedMediaType(mime) => write!(f, "unsupported media type {}", mime),
            SkipReason::MissingCapability => f.write_str("color management unavailable"),
        }
    }
}

/// Result of [`Ingest::handle_upload`].
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// The pipeline did not run.
    Skipped(SkipReason),
    /// The pipeline ran; the report holds the outcome or failure.
    Processed(Report),
}

/// Upload hook wiring configuration, capability and pipeline together.
#[derive(Debug)]
pub struct Ingest<S = FsStore> {
    config: IngestConfig,
    capability: Capability,
    pipeline: Option<Pipeline<S>>,
}

impl Ingest<FsStore> {
    /// Probes color management and builds a filesystem-backed hook.
    ///
    /// # Errors
    ///
    /// [`FixError::MissingCapability`] when the configured sRGB profile
    /// cannot be loaded. A failed probe is not an error: the hook is built
    /// and skips every upload.
    pub fn new(config: IngestConfig) -> FixResult<Self> {
        let store = FsStore::new().with_jpeg_quality(config.jpeg_quality);
        Self::with_store(config, store, Capability::probe())
    }
}

impl<S: ImageStore> Ingest<S> {
    /// Builds a hook over a custom store and a known capability.
    pub fn with_store(config: IngestConfig, store: S, capability: Capability) -> FixResult<Self> {
        let pipeline = if capability.is_available() {
            let asset = config
                .load_asset()
                .map_err(|e| FixError::MissingCapability(format!("cannot load sRGB profile: {}", e)))?;
            Some(Pipeline::new(config.policy(), Converter::new(asset, store)))
        } else {
            None
        };

        Ok(Self {
            config,
            capability,
            pipeline,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Probed capability.
    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Pipeline, if color management is available.
    pub fn pipeline(&self) -> Option<&Pipeline<S>> {
        self.pipeline.as_ref()
    }

    /// Standing warning to show while conversion is unavailable.
    pub fn notice(&self) -> Option<&'static str> {
        self.capability.notice()
    }

    /// Runs the pipeline for an upload unless disabled, unsupported or
    /// unavailable.
    ///
    /// Never fails: errors end up in the [`Report`].
    pub fn handle_upload(&self, upload: &Upload) -> IngestOutcome {
        if !self.config.auto_process {
            tracing::debug!(path = %upload.path.display(), "auto-processing disabled");
            return IngestOutcome::Skipped(SkipReason::Disabled);
        }

        let format = Format::from_mime(&upload.mime);
        if !matches!(format, Format::Jpeg | Format::Png) || !format.is_supported() {
            tracing::info!(path = %upload.path.display(), mime = %upload.mime, "skipping unsupported media type");
            return IngestOutcome::Skipped(SkipReason::UnsupportedMediaType(upload.mime.clone()));
        }

        let Some(pipeline) = &self.pipeline else {
            tracing::debug!(path = %upload.path.display(), "color management unavailable");
            return IngestOutcome::Skipped(SkipReason::MissingCapability);
        };

        let report = pipeline.process(&upload.path);
        if let Some(failure) = report.failure() {
            tracing::warn!(
                path = %upload.path.display(),
                kind = %failure.kind,
                error = %failure.message,
                "upload not converted"
            );
        }
        IngestOutcome::Processed(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stage;
    use csf_io::{Colorspace, EncodeOptions, PixelLayout, RasterImage};

    fn png_upload(dir: &std::path::Path) -> Upload {
        let path = dir.join("upload.png");
        let image = RasterImage::from_u8(Format::Png, 2, 2, PixelLayout::Rgb, Colorspace::Srgb, vec![5; 12]);
        csf_io::write_atomic(&path, &image, &EncodeOptions::default()).unwrap();
        Upload::new(path, "image/png")
    }

    #[test]
    fn test_disabled() {
        let config = IngestConfig {
            auto_process: false,
            ..IngestConfig::default()
        };
        let ingest = Ingest::new(config).unwrap();
        let outcome = ingest.handle_upload(&Upload::new("/tmp/x.png", "image/png"));
        assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::Disabled)));
    }

    #[test]
    fn test_unsupported_mime() {
        let ingest = Ingest::new(IngestConfig::default()).unwrap();
        for mime in ["image/gif", "image/webp", "application/pdf", ""] {
            let outcome = ingest.handle_upload(&Upload::new("/tmp/x", mime));
            assert!(
                matches!(outcome, IngestOutcome::Skipped(SkipReason::UnsupportedMediaType(_))),
                "{}",
                mime
            );
        }
    }

    #[test]
    fn test_missing_capability_skips_with_notice() {
        let ingest = Ingest::with_store(
            IngestConfig::default(),
            FsStore::new(),
            Capability::Missing("probe failed".into()),
        )
        .unwrap();
        assert!(ingest.notice().is_some());
        assert!(ingest.pipeline().is_none());

        let dir = tempfile::tempdir().unwrap();
        let outcome = ingest.handle_upload(&png_upload(dir.path()));
        assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::MissingCapability)));
    }

    #[test]
    fn test_processed() {
        let dir = tempfile::tempdir().unwrap();
        let ingest = Ingest::new(IngestConfig::default()).unwrap();
        assert!(ingest.notice().is_none());

        match ingest.handle_upload(&png_upload(dir.path())) {
            IngestOutcome::Processed(report) => assert_eq!(report.stage(), Stage::Declined),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_asset_path() {
        let config = IngestConfig {
            srgb_profile: Some("/nonexistent/sRGB2014.icc".into()),
            ..IngestConfig::default()
        };
        assert!(matches!(Ingest::new(config), Err(FixError::MissingCapability(_))));
    }
}
