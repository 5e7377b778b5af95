//! Configuration file support for the trainer.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/trainer/config.toml`.

use crate::types::{DEFAULT_REPS, DEFAULT_REST_SECONDS, DEFAULT_SETS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: PlanDefaults,
}

/// Fallback values the parser applies when a plan omits an attribute
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanDefaults {
    #[serde(default = "default_sets")]
    pub sets: u32,

    #[serde(default = "default_reps")]
    pub reps: String,

    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            sets: default_sets(),
            reps: default_reps(),
            rest_seconds: default_rest_seconds(),
        }
    }
}

// Default value functions
fn default_sets() -> u32 {
    DEFAULT_SETS
}

fn default_reps() -> String {
    DEFAULT_REPS.into()
}

fn default_rest_seconds() -> u32 {
    DEFAULT_REST_SECONDS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
        base.join("trainer").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
