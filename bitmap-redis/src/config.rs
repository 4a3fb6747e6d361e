use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Connection settings for Redis-backed bitmaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    /// Server URL (e.g. "redis://127.0.0.1:6379/0")
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-call deadline (e.g. "250ms"); no deadline when unset
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

fn default_url() -> String {
    String::from("redis://127.0.0.1:6379/")
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: None,
        }
    }
}

impl RedisConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("Failed to parse YAML redis config")
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: RedisConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?;
        Ok(config)
    }
}
