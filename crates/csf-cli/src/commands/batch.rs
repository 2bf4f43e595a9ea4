//! Batch command: fix every image matching a glob.
//!
//! Images are independent, so they are processed in parallel; one failure
//! never stops the others.

use crate::{BatchArgs, SettingsArgs};
use anyhow::{bail, Result};
use csf_core::{Report, Stage};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, trace};

/// Per-stage counts over a batch.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub declined: usize,
    pub converted: usize,
    pub would_convert: usize,
    pub failed: usize,
}

impl Summary {
    /// Tallies finished reports.
    pub fn from_reports(reports: &[Report]) -> Self {
        let mut summary = Summary {
            total: reports.len(),
            ..Summary::default()
        };
        for report in reports {
            match report.stage() {
                Stage::Declined => summary.declined += 1,
                Stage::Converted => summary.converted += 1,
                Stage::Failed => summary.failed += 1,
                Stage::Inspected => {
                    if report.decision().is_some_and(|d| d.should_convert) {
                        summary.would_convert += 1;
                    } else {
                        summary.declined += 1;
                    }
                }
                Stage::Uninspected => {}
            }
        }
        summary
    }
}

pub fn run(args: BatchArgs, settings: &SettingsArgs, verbose: u8) -> Result<()> {
    trace!(pattern = %args.input, dry_run = args.dry_run, "batch::run");

    // Find matching files
    let files: Vec<PathBuf> = glob::glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        bail!("No files match pattern: {}", args.input);
    }

    info!(files = files.len(), pattern = %args.input, "Starting batch");
    if verbose > 0 && !args.json {
        println!("Found {} files matching '{}'", files.len(), args.input);
    }

    let pipeline = super::build_pipeline(settings)?;

    // Process files in parallel
    let reports: Vec<Report> = files
        .par_iter()
        .map(|path| {
            if args.dry_run {
                pipeline.evaluate(path)
            } else {
                pipeline.process(path)
            }
        })
        .collect();

    for report in &reports {
        if verbose > 0 || args.json || report.stage() != Stage::Declined {
            super::print_report(report, args.json)?;
        }
    }

    let summary = Summary::from_reports(&reports);
    info!(?summary, "Batch complete");
    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else if args.dry_run {
        println!(
            "Scanned: {} files, {} would convert, {} ok, {} failed",
            summary.total, summary.would_convert, summary.declined, summary.failed
        );
    } else {
        println!(
            "Processed: {} files, {} converted, {} ok, {} failed",
            summary.total, summary.converted, summary.declined, summary.failed
        );
    }

    if summary.failed > 0 {
        bail!("{} files failed", summary.failed);
    }

    Ok(())
}
