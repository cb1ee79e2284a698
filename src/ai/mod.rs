//! LLM Integration Layer
//!
//! Provider abstraction and response handling for the analysis agents.
//!
//! ## Modules
//!
//! - `provider`: LlmProvider trait plus OpenAI and Ollama implementations
//! - `extract`: JSON extraction from prose-wrapped LLM output

pub mod extract;
pub mod provider;

pub use extract::first_json_object;
pub use provider::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, SharedProvider,
    TokenUsage, create_provider,
};
