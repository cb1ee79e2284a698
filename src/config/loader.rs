//! Configuration Loader (Figment-based)
//!
//! Resolution chain:
//! 1. Built-in defaults (Serialized)
//! 2. Project config (venturescope.toml)
//! 3. Environment variables (VENTURESCOPE_* prefix, `__` nesting)

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::debug;

use super::types::Config;
use crate::types::{Result, VentureError};

pub const PROJECT_CONFIG_FILE: &str = "venturescope.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full resolution chain.
    pub fn load() -> Result<Config> {
        Self::load_with_file(Path::new(PROJECT_CONFIG_FILE))
    }

    /// Load using a specific config file path in place of the default.
    pub fn load_with_file(path: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if path.exists() {
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // e.g. VENTURESCOPE_LLM__MODEL -> llm.model
        figment = figment.merge(Env::prefixed("VENTURESCOPE_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| VentureError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }
}
