//! Ingest configuration.
//!
//! ```yaml
//! auto_process: true
//! srgb_profile: /usr/share/color/icc/sRGB2014.icc
//! extra_aliases: ["Display Standard"]
//! jpeg_quality: 92
//! ```

use crate::Policy;
use csf_icc::{IccResult, SrgbAsset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading an [`IngestConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    NotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Settings for the upload hook. The core itself takes no configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Process images automatically on upload.
    pub auto_process: bool,
    /// Canonical sRGB `.icc` file; lcms2's built-in profile when unset.
    pub srgb_profile: Option<PathBuf>,
    /// Descriptions treated as sRGB on top of the defaults.
    pub extra_aliases: Vec<String>,
    /// JPEG re-encode quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            auto_process: true,
            srgb_profile: None,
            extra_aliases: Vec::new(),
            jpeg_quality: 90,
        }
    }
}

impl IngestConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    /// Default policy extended with `extra_aliases`.
    pub fn policy(&self) -> Policy {
        Policy::default().with_aliases(self.extra_aliases.iter().cloned())
    }

    /// Loads the configured sRGB asset.
    pub fn load_asset(&self) -> IccResult<SrgbAsset> {
        match &self.srgb_profile {
            Some(path) => SrgbAsset::from_file(path),
            None => SrgbAsset::builtin(),
        }
    }
}
