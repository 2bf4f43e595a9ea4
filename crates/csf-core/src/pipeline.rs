//! Inspect → decide → convert, one image at a time.

use crate::{
    inspect, ColorProfileInfo, ConversionDecision, ConversionOutcome, Converter, ErrorKind, FixError, ImageHandle,
    ImageStore, Policy,
};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where an image ended up.
///
/// `Uninspected → Inspected → Declined | Converted | Failed`, with
/// `Uninspected → Failed` on decode errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Not yet decoded.
    Uninspected,
    /// Decision made, nothing written (dry run).
    Inspected,
    /// Policy said no conversion.
    Declined,
    /// New sRGB pixels were written.
    Converted,
    /// A stage failed; see [`Report::failure`].
    Failed,
}

impl Stage {
    /// True for `Declined`, `Converted` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Declined | Stage::Converted | Stage::Failed)
    }

    /// Lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Uninspected => "uninspected",
            Stage::Inspected => "inspected",
            Stage::Declined => "declined",
            Stage::Converted => "converted",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure tag attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl From<&FixError> for Failure {
    fn from(err: &FixError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Everything one pipeline invocation produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    path: PathBuf,
    stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<ColorProfileInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<ConversionDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<ConversionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<Failure>,
}

impl Report {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            stage: Stage::Uninspected,
            info: None,
            decision: None,
            outcome: None,
            failure: None,
        }
    }

    fn inspected(mut self, info: ColorProfileInfo, decision: ConversionDecision) -> Self {
        self.stage = Stage::Inspected;
        self.info = Some(info);
        self.decision = Some(decision);
        self
    }

    fn finish(mut self, stage: Stage, outcome: ConversionOutcome) -> Self {
        self.stage = stage;
        self.outcome = Some(outcome);
        self
    }

    fn failed(mut self, err: &FixError) -> Self {
        if let Some(info) = &self.info {
            self.outcome = Some(ConversionOutcome::unconverted(info));
        }
        self.stage = Stage::Failed;
        self.failure = Some(Failure::from(err));
        self
    }

    /// Image path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Inspection result, if decoding succeeded.
    pub fn info(&self) -> Option<&ColorProfileInfo> {
        self.info.as_ref()
    }

    /// Policy decision, if inspection succeeded.
    pub fn decision(&self) -> Option<&ConversionDecision> {
        self.decision.as_ref()
    }

    /// Outcome to persist.
    ///
    /// Present for every image that was inspected and ran to a terminal
    /// stage. A failed conversion yields an unconverted outcome.
    pub fn outcome(&self) -> Option<&ConversionOutcome> {
        self.outcome.as_ref()
    }

    /// Failure tag when the stage is [`Stage::Failed`].
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// True if new pixels were written.
    pub fn is_converted(&self) -> bool {
        self.stage == Stage::Converted
    }
}

/// Runs the policy and the converter over stored images.
///
/// Holds no per-image state, so one pipeline can serve many threads.
#[derive(Debug)]
pub struct Pipeline<S> {
    policy: Policy,
    converter: Converter<S>,
}

impl<S: ImageStore> Pipeline<S> {
    /// Creates a pipeline.
    ///
    /// Warns if the policy would not recognize the converter's sRGB asset,
    /// since converted images would then be converted again on every run.
    pub fn new(policy: Policy, converter: Converter<S>) -> Self {
        let description = converter.asset().description();
        if !policy.recognizes(description) {
            tracing::warn!(%description, "sRGB asset is not recognized as sRGB by the policy");
        }
        Self { policy, converter }
    }

    /// Policy in use.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Converter in use.
    pub fn converter(&self) -> &Converter<S> {
        &self.converter
    }

    /// Loads, inspects, decides and converts the image at `path`.
    pub fn process(&self, path: &Path) -> Report {
        match self.converter.store().load(path) {
            Ok(handle) => self.process_handle(&handle),
            Err(e) => fail(Report::new(path), e),
        }
    }

    /// Same as [`Pipeline::process`] for an already loaded image.
    pub fn process_handle(&self, handle: &ImageHandle) -> Report {
        let report = Report::new(handle.path());
        let (info, decision) = match self.assess(handle) {
            Ok(assessed) => assessed,
            Err(e) => return fail(report, e),
        };
        let report = report.inspected(info.clone(), decision);

        if !decision.should_convert {
            return report.finish(Stage::Declined, ConversionOutcome::unconverted(&info));
        }

        match self.converter.convert(handle) {
            Ok(converted) => {
                tracing::info!(path = %handle.path().display(), reason = %decision.reason, "converted to sRGB");
                let outcome = ConversionOutcome::converted(&info, converted.image.colorspace, converted.icc_description);
                report.finish(Stage::Converted, outcome)
            }
            Err(e) => fail(report, e),
        }
    }

    /// Loads, inspects and decides without writing anything.
    ///
    /// The report stops at [`Stage::Inspected`] (or [`Stage::Failed`]).
    pub fn evaluate(&self, path: &Path) -> Report {
        let handle = match self.converter.store().load(path) {
            Ok(handle) => handle,
            Err(e) => return fail(Report::new(path), e),
        };
        match self.assess(&handle) {
            Ok((info, decision)) => Report::new(path).inspected(info, decision),
            Err(e) => fail(Report::new(path), e),
        }
    }

    fn assess(&self, handle: &ImageHandle) -> Result<(ColorProfileInfo, ConversionDecision), FixError> {
        let info = inspect(handle)?;
        let decision = self.policy.decide(&info);
        tracing::info!(
            path = %handle.path().display(),
            convert = decision.should_convert,
            reason = %decision.reason,
            "decided"
        );
        Ok((info, decision))
    }
}

fn fail(report: Report, err: FixError) -> Report {
    tracing::warn!(path = %report.path().display(), kind = %err.kind(), error = %err, "image failed");
    report.failed(&err)
}
