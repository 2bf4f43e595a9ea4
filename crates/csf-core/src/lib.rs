//! # csf-core
//!
//! Normalizes uploaded JPEG and PNG images to sRGB.
//!
//! For each image the pipeline:
//!
//! 1. **Inspects** it ([`inspect`]): raster colorspace, whether an ICC
//!    profile is embedded, and the profile's description.
//! 2. **Decides** ([`Policy::decide`]): an ordered rule table that leaves
//!    untagged and sRGB-tagged images alone and flags CMYK, gray and
//!    foreign-profile images.
//! 3. **Converts** ([`Converter`]) flagged images from their embedded profile
//!    to the canonical sRGB profile and atomically rewrites them.
//!
//! Every invocation ends in a [`Report`] carrying a serializable
//! [`ConversionOutcome`] for the caller to store as image metadata.
//!
//! # Example
//!
//! ```rust,ignore
//! use csf_core::{Converter, FsStore, Pipeline, Policy};
//! use csf_icc::SrgbAsset;
//!
//! let pipeline = Pipeline::new(Policy::default(), Converter::new(SrgbAsset::builtin()?, FsStore::new()));
//! let report = pipeline.process("photo.jpg".as_ref());
//! println!("{}: {}", report.path().display(), report.stage());
//! ```
//!
//! The upload hook ([`Ingest`]) adds the caller-side checks: an
//! `auto_process` switch, a MIME filter and a one-time capability probe.

#![warn(missing_docs)]

mod capability;
mod config;
mod convert;
mod error;
mod info;
mod ingest;
mod outcome;
mod pipeline;
mod policy;
mod store;

pub use capability::{Capability, NOTICE};
pub use config::{ConfigError, IngestConfig};
pub use convert::{ConvertedImage, Converter};
pub use error::{ErrorKind, FixError, FixResult};
pub use info::{inspect, ColorProfileInfo, ImageHandle};
pub use ingest::{Ingest, IngestOutcome, SkipReason, Upload};
pub use outcome::ConversionOutcome;
pub use pipeline::{Failure, Pipeline, Report, Stage};
pub use policy::{decide, ConversionDecision, Policy, ReasonCode, SrgbAliases, DEFAULT_ALIASES};
pub use store::{FsStore, ImageStore};
