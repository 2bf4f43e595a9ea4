//! csf - sRGB color space fixer
//!
//! Inspects JPEG/PNG images and converts those tagged with a non-sRGB
//! profile to sRGB in place.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "csf")]
#[command(author, version, about = "Normalize JPEG/PNG color to sRGB")]
#[command(long_about = "
Inspects embedded ICC profiles and converts images that are not sRGB
(CMYK, grayscale, Adobe RGB and other wide-gamut profiles) to sRGB,
replacing the file atomically.

Examples:
  csf info photo.jpg                    # Colorspace, profile and decision
  csf fix photo.jpg --dry-run           # Show what would happen
  csf fix photo.jpg                     # Convert in place if needed
  csf batch 'uploads/**/*.jpg' -j 8     # Whole library in parallel
  csf ingest upload.png --mime image/png --config csf.yaml
  csf probe                             # Check color management support
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace; RUST_LOG overrides)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    #[command(flatten)]
    settings: SettingsArgs,
}

/// Settings shared by every command that runs the pipeline.
#[derive(Args, Clone, Default)]
struct SettingsArgs {
    /// YAML config file (auto_process, srgb_profile, extra_aliases, jpeg_quality)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Canonical sRGB .icc file (default: built-in sRGB)
    #[arg(long, global = true)]
    srgb_profile: Option<PathBuf>,

    /// Extra profile description to treat as sRGB (repeatable)
    #[arg(long = "alias", global = true)]
    aliases: Vec<String>,

    /// JPEG re-encode quality (1-100)
    #[arg(short, long, global = true)]
    quality: Option<u8>,

    /// Rendering intent: perceptual, relative, saturation, absolute
    #[arg(long, global = true, default_value = "perceptual")]
    intent: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show colorspace, embedded profile and policy decision
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Convert images to sRGB in place when needed
    #[command(visible_alias = "f")]
    Fix(FixArgs),

    /// Run fix over a glob pattern in parallel
    #[command(visible_alias = "b")]
    Batch(BatchArgs),

    /// Run the upload hook for one file
    Ingest(IngestArgs),

    /// Check that color management works
    Probe(ProbeArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FixArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Decide only, write nothing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// Input pattern (glob), e.g. "uploads/**/*.jpg"
    input: String,

    /// Decide only, write nothing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Machine-readable output (JSON lines, then a summary object)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct IngestArgs {
    /// Uploaded file
    input: PathBuf,

    /// Declared MIME type (default: guessed from content)
    #[arg(short, long)]
    mime: Option<String>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ProbeArgs {
    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Info(args) => commands::info::run(args, &cli.settings, cli.verbose),
        Commands::Fix(args) => commands::fix::run(args, &cli.settings, cli.verbose),
        Commands::Batch(args) => commands::batch::run(args, &cli.settings, cli.verbose),
        Commands::Ingest(args) => commands::ingest::run(args, &cli.settings, cli.verbose),
        Commands::Probe(args) => commands::probe::run(args, &cli.settings, cli.verbose),
    }
}
