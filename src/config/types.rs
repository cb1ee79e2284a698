//! Configuration Types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ai::ProviderConfig;
use crate::constants::network;
use crate::types::{Result, VentureError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            llm: ProviderConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                VentureError::Config(format!(
                    "invalid bind address '{}': {}",
                    self.server.bind_addr, e
                ))
            })?;

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(VentureError::Config(format!(
                "temperature {} out of range [0.0, 2.0]",
                self.llm.temperature
            )));
        }

        if self.storage.db_path.as_os_str().is_empty() {
            return Err(VentureError::Config("storage.db_path must not be empty".into()));
        }

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: network::DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file path
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("venturescope.db"),
        }
    }
}
