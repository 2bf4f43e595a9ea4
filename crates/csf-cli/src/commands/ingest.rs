//! Ingest command: run the upload hook on one file.

use crate::{IngestArgs, SettingsArgs};
use anyhow::{bail, Context, Result};
use csf_core::{Ingest, IngestOutcome, Stage, Upload};
use csf_io::Format;

pub fn run(args: IngestArgs, settings: &SettingsArgs, _verbose: u8) -> Result<()> {
    let config = super::load_config(settings)?;
    let ingest = Ingest::new(config).context("Failed to set up ingest")?;
    if let Some(notice) = ingest.notice() {
        eprintln!("Warning: {}", notice);
    }

    let mime = match &args.mime {
        Some(mime) => mime.clone(),
        None => Format::detect(&args.input)
            .with_context(|| format!("Failed to read: {}", args.input.display()))?
            .mime_type()
            .to_string(),
    };

    match ingest.handle_upload(&Upload::new(&args.input, mime)) {
        IngestOutcome::Skipped(reason) => {
            if args.json {
                println!("{}", serde_json::json!({ "path": args.input, "skipped": reason.to_string() }));
            } else {
                println!("{}: skipped ({})", args.input.display(), reason);
            }
            Ok(())
        }
        IngestOutcome::Processed(report) => {
            super::print_report(&report, args.json)?;
            if report.stage() == Stage::Failed {
                bail!("{} was not converted", args.input.display());
            }
            Ok(())
        }
    }
}
