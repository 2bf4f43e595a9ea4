//! Image info command.
//!
//! Shows what the fixer sees in an image and what it would decide.

use crate::{InfoArgs, SettingsArgs};
use anyhow::{Context, Result};
use csf_core::{inspect, ColorProfileInfo, ConversionDecision, ImageHandle};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct InfoRecord<'a> {
    path: &'a Path,
    format: &'static str,
    width: u32,
    height: u32,
    bits: u8,
    file_size: u64,
    #[serde(flatten)]
    info: &'a ColorProfileInfo,
    decision: &'a ConversionDecision,
}

/// Runs the info command.
pub fn run(args: InfoArgs, settings: &SettingsArgs, verbose: u8) -> Result<()> {
    let policy = super::load_config(settings)?.policy();

    for path in &args.input {
        let file_size = fs::metadata(path)
            .with_context(|| format!("Failed to stat: {}", path.display()))?
            .len();
        let handle = ImageHandle::open(path).with_context(|| format!("Failed to load: {}", path.display()))?;
        let info = inspect(&handle).with_context(|| format!("Failed to inspect: {}", path.display()))?;
        let decision = policy.decide(&info);
        let image = handle.image();

        if args.json {
            let record = InfoRecord {
                path,
                format: image.format.name(),
                width: image.width,
                height: image.height,
                bits: image.data.bits(),
                file_size,
                info: &info,
                decision: &decision,
            };
            println!("{}", serde_json::to_string(&record)?);
            continue;
        }

        println!("{}", path.display());
        println!("  Format:      {} ({})", image.format.name(), super::format_size(file_size));
        println!("  Resolution:  {}x{}", image.width, image.height);
        println!("  Colorspace:  {}", info.colorspace());
        println!(
            "  ICC profile: {}",
            match (info.has_icc_profile(), info.description()) {
                (false, _) => "none".to_string(),
                (true, Some(desc)) => desc.to_string(),
                (true, None) => "present, unreadable".to_string(),
            }
        );
        if verbose > 0 {
            println!("  Layout:      {:?}, {}-bit", image.layout, image.data.bits());
            if let Some(icc) = &image.icc_profile {
                println!("  ICC size:    {}", super::format_size(icc.len() as u64));
            }
        }
        println!(
            "  Decision:    {} ({})",
            if decision.should_convert { "convert" } else { "keep" },
            decision.reason
        );

        if args.input.len() > 1 {
            println!();
        }
    }

    Ok(())
}
