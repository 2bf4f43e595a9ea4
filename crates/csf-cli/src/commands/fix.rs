//! Fix command: convert named files in place.

use crate::{FixArgs, SettingsArgs};
use anyhow::{bail, Result};
use csf_core::Stage;
use tracing::trace;

pub fn run(args: FixArgs, settings: &SettingsArgs, verbose: u8) -> Result<()> {
    trace!(files = args.input.len(), dry_run = args.dry_run, "fix::run");
    let pipeline = super::build_pipeline(settings)?;

    let mut failed = 0;
    for path in &args.input {
        let report = if args.dry_run {
            pipeline.evaluate(path)
        } else {
            pipeline.process(path)
        };

        if report.stage() == Stage::Failed {
            failed += 1;
        }
        if verbose > 0 || args.json || report.stage() != Stage::Declined {
            super::print_report(&report, args.json)?;
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed", failed, args.input.len());
    }
    Ok(())
}
