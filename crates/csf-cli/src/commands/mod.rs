//! CLI command implementations

pub mod batch;
pub mod fix;
pub mod info;
pub mod ingest;
pub mod probe;

use crate::SettingsArgs;
use anyhow::{Context, Result};
use csf_core::{Capability, Converter, FsStore, IngestConfig, Pipeline, Report, Stage};
use csf_icc::Intent;

/// Loads the YAML config (if any) and applies command-line overrides.
pub fn load_config(settings: &SettingsArgs) -> Result<IngestConfig> {
    let mut config = match &settings.config {
        Some(path) => IngestConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => IngestConfig::default(),
    };

    if let Some(path) = &settings.srgb_profile {
        config.srgb_profile = Some(path.clone());
    }
    if let Some(quality) = settings.quality {
        config.jpeg_quality = quality;
    }
    config.extra_aliases.extend(settings.aliases.iter().cloned());
    config.validate().context("Invalid settings")?;

    Ok(config)
}

/// Builds a filesystem pipeline, failing if color management is missing.
pub fn build_pipeline(settings: &SettingsArgs) -> Result<Pipeline<FsStore>> {
    let config = load_config(settings)?;
    let intent: Intent = settings.intent.parse().context("Invalid --intent")?;

    Capability::probe().require()?;
    let asset = config.load_asset().context("Failed to load sRGB profile")?;

    let store = FsStore::new().with_jpeg_quality(config.jpeg_quality);
    let converter = Converter::new(asset, store).with_intent(intent);
    Ok(Pipeline::new(config.policy(), converter))
}

/// One-line human-readable summary of a report.
pub fn describe(report: &Report) -> String {
    let mut line = format!("{}: {}", report.path().display(), report.stage());

    if let Some(decision) = report.decision() {
        let verdict = match (report.stage(), decision.should_convert) {
            (Stage::Inspected, true) => "would convert, ",
            (Stage::Inspected, false) => "would keep, ",
            _ => "",
        };
        line.push_str(&format!(" ({}{})", verdict, decision.reason));
    }
    if let Some(failure) = report.failure() {
        line.push_str(&format!(" [{}] {}", failure.kind, failure.message));
    }
    line
}

/// Prints a report as text or as one JSON line.
pub fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{}", describe(report));
    }
    Ok(())
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let settings = SettingsArgs {
            quality: Some(70),
            aliases: vec!["Display Standard".into()],
            intent: "perceptual".into(),
            ..SettingsArgs::default()
        };
        let config = load_config(&settings).unwrap();
        assert_eq!(config.jpeg_quality, 70);
        assert!(config.policy().recognizes("DISPLAY STANDARD"));
    }

    #[test]
    fn test_bad_quality() {
        let settings = SettingsArgs {
            quality: Some(0),
            ..SettingsArgs::default()
        };
        assert!(load_config(&settings).is_err());
    }

    #[test]
    fn test_bad_intent() {
        let settings = SettingsArgs {
            intent: "vivid".into(),
            ..SettingsArgs::default()
        };
        assert!(build_pipeline(&settings).is_err());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.00 KB");
    }
}
