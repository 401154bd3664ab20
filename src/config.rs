//! Configuration file and environment overrides
//!
//! Settings live in a YAML file, by default
//! `<data_dir>/tipforge/config.yaml`. Every key is optional; a missing
//! file means all defaults. The service credential is usually supplied
//! through the environment instead:
//!
//! - `TIPFORGE_API_KEY`, falling back to `XAI_API_KEY`
//!
//! ```yaml
//! llm:
//!   model: grok-beta
//!   request_timeout_secs: 60
//! enrichment:
//!   rate_limit_delay_ms: 1000
//!   batch_size: 10
//! catalogue:
//!   trending_epsilon_ms: 1
//! ```

use crate::catalogue::TrendingPolicy;
use crate::enrich::EnrichmentConfig;
use crate::llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Environment variables checked for the credential, in order
pub const API_KEY_VARS: [&str; 2] = ["TIPFORGE_API_KEY", "XAI_API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    /// Lower bound on the elapsed time used by the trending sort
    pub trending_epsilon_ms: u64,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            trending_epsilon_ms: 1,
        }
    }
}

impl CatalogueConfig {
    pub fn trending_policy(&self) -> TrendingPolicy {
        TrendingPolicy::new(Duration::from_millis(self.trending_epsilon_ms))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TipforgeConfig {
    pub llm: LlmConfig,
    pub enrichment: EnrichmentConfig,
    pub catalogue: CatalogueConfig,
}

impl TipforgeConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read `path`, or the default location when `None`.
    ///
    /// A missing file at the default location yields defaults; a missing
    /// file that was asked for explicitly is an error. Environment
    /// overrides are applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading config");
                Self::from_yaml_str(&text)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());
        if let Some(key) = key {
            self.llm.api_key = Some(key);
        }
    }
}

/// Directory for tipforge's data: `<data_dir>/tipforge`
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"))
        .join("tipforge")
}

pub fn default_config_path() -> PathBuf {
    data_dir().join("config.yaml")
}

pub fn default_db_path() -> PathBuf {
    data_dir().join("tipforge.db")
}
