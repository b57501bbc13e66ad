use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::market::{Country, Period};

pub const DEFAULT_BACKEND_URL: &str = "https://pluggy.onrender.com";

/// Timestamp counts at or below this make a historical response too sparse to
/// chart; the reconstructor fabricates a synthetic grid instead.
pub const DEFAULT_SPARSE_THRESHOLD: usize = 2;

pub const DEFAULT_REFRESH_SECS: u64 = 15;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            base_url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default = "default_country")]
    pub country: Country,
    #[serde(default)]
    pub period: Period,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default = "default_sparse_threshold")]
    pub sparse_threshold: usize,
}

fn default_country() -> Country {
    Country::Brazil
}

fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH_SECS
}

fn default_sparse_threshold() -> usize {
    DEFAULT_SPARSE_THRESHOLD
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            backend: BackendConfig::default(),
            country: default_country(),
            period: Period::default(),
            refresh_secs: default_refresh_secs(),
            sparse_threshold: default_sparse_threshold(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the platform config dir, falling back to
    /// defaults when no file has been written yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "cambial", "cambial")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
backend:
  base_url: "http://localhost:9000"
country: "argentina"
period: "6h"
refresh_secs: 30
sparse_threshold: 4
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.backend.base_url, "http://localhost:9000");
        assert_eq!(config.country, Country::Argentina);
        assert_eq!(config.period, Period::SixHours);
        assert_eq!(config.refresh_secs, 30);
        assert_eq!(config.sparse_threshold, 4);
    }

    #[test]
    fn test_config_defaults_apply() {
        let config: AppConfig = serde_yaml::from_str("country: \"brazil\"").unwrap();
        assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.country, Country::Brazil);
        assert_eq!(config.period, Period::TwentyFourHours);
        assert_eq!(config.refresh_secs, DEFAULT_REFRESH_SECS);
        assert_eq!(config.sparse_threshold, DEFAULT_SPARSE_THRESHOLD);
    }
}
