use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::registry::ENGINE_ROARING;

/// Bitmap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Engine used for the process-wide default bitmap
    #[serde(default = "default_engine")]
    pub engine: String,
}

fn default_engine() -> String {
    String::from(ENGINE_ROARING)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: default_engine(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("Failed to parse YAML bitmap config")
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?;
        Ok(config)
    }

    /// Install the configured engine as the default bitmap.
    pub fn apply(&self) -> crate::Result<()> {
        crate::default::install(&self.engine)
    }
}
