//! Runner configuration loaded from `tournament.toml`

use anyhow::{Context, Result};
use log::debug;
use ranking_core::{Glicko2, Glicko2Config, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Looked up in the working directory unless `--config` says otherwise
pub const DEFAULT_CONFIG_PATH: &str = "tournament.toml";

/// Where the rating book lives when the config does not say
pub const DEFAULT_RATING_BOOK: &str = "tournament_ratings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Rating engine tunables
    pub rating: Glicko2Config,
    /// JSON file holding current ratings and applied updates
    pub rating_book: PathBuf,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            rating: Glicko2Config::default(),
            rating_book: PathBuf::from(DEFAULT_RATING_BOOK),
        }
    }
}

impl ArenaConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse configuration")
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("In {}", path.display()))
    }

    /// Build the rating engine, validating the tunables
    pub fn engine(&self) -> Result<Glicko2, ValidationError> {
        Glicko2::new(self.rating.clone())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
