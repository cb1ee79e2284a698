//! Configuration
//!
//! Figment-based configuration merged from defaults, an optional
//! `venturescope.toml`, and `VENTURESCOPE_`-prefixed environment variables.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{Config, ServerConfig, StorageConfig};
