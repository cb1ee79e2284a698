//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Design Principles
//!
//! - Single unified error type (VentureError) for the entire application
//! - Agent failures are recoverable: they leave the analysis row incomplete
//!   and the next client poll retries
//! - No panic/unwrap outside tests

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VentureError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Agent Errors
    // -------------------------------------------------------------------------
    /// Network/provider failure while calling the LLM. The agent row stays
    /// unfinished; the next poll cycle retries.
    #[error("agent '{agent}' invocation failed: {message}")]
    AgentInvocation { agent: String, message: String },

    /// LLM returned non-parseable or schema-violating output. Same recovery
    /// path as AgentInvocation.
    #[error("agent '{agent}' returned a malformed response: {message}")]
    MalformedResponse { agent: String, message: String },

    /// Generic LLM API error outside an agent invocation.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl VentureError {
    /// Create an agent invocation error
    pub fn agent_invocation(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AgentInvocation {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed_response(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Check if this error is recoverable by a later poll cycle
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AgentInvocation { .. } | Self::MalformedResponse { .. } | Self::LlmApi(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, VentureError>;

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| VentureError::Storage(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| VentureError::Storage(format!("{}: {}", f().into(), e)))
    }
}
