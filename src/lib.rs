//! VentureScope - AI-Powered Startup Idea Validation
//!
//! A validation service that runs a submitted business idea through a
//! fixed sequence of eight specialized LLM agents and folds their analyses
//! into a single normalized investor report.
//!
//! ## Core Features
//!
//! - **Sequential Agent Pipeline**: problem, market, competition, business
//!   model, team, legal, metrics, and investor agents, each building on
//!   the outputs of the previous ones
//! - **Durable Progress**: every agent claim and outcome is persisted, so
//!   polling is idempotent and a restart resumes where the rows left off
//! - **Normalized Reports**: a total, idempotent normalizer guarantees the
//!   canonical report shape regardless of what the LLM returned
//! - **Provider Abstraction**: OpenAI-compatible and Ollama backends
//!   behind one trait
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use venturescope::{AgentInvoker, AppState, Database, create_provider};
//!
//! let config = venturescope::ConfigLoader::load()?;
//! let db = Arc::new(Database::open(&config.storage.db_path)?);
//! let provider = create_provider(&config.llm)?;
//! let state = AppState::new(db, AgentInvoker::new(provider));
//! venturescope::server::serve(&config.server.bind_addr, state).await?;
//! ```
//!
//! ## Modules
//!
//! - [`agents`]: agent kinds, sequencing, invocation, score aggregation
//! - [`ai`]: LLM provider abstraction and response extraction
//! - [`report`]: investor report assembly and schema normalization
//! - [`server`]: axum HTTP API
//! - [`storage`]: SQLite persistence with connection pooling

pub mod agents;
pub mod ai;
pub mod config;
pub mod constants;
pub mod report;
pub mod server;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, ServerConfig, StorageConfig};

// Error Types
pub use types::error::{Result, ResultExt, VentureError};

// Storage
pub use storage::database::PoolConfig;
pub use storage::{Database, SharedDatabase};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use agents::{
    AgentInvoker, AgentKind, AgentOutcome, IdeaQuality, ScoreSummary, ValidationPhase,
    aggregate_scores, score_idea_quality,
};

pub use report::{assemble, normalize};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, ProviderConfig, SharedProvider, create_provider};

// =============================================================================
// Server Re-exports
// =============================================================================

pub use server::AppState;
