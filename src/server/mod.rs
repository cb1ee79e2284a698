//! HTTP API
//!
//! axum router and handlers for the validation pipeline. Every handler
//! returns `Result<_, ApiError>` so errors reach the client as structured
//! JSON.

pub mod error;
mod idea;
mod progress;
mod validations;

pub use error::ApiError;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agents::AgentInvoker;
use crate::storage::SharedDatabase;
use crate::types::Result;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: SharedDatabase,
    pub invoker: AgentInvoker,
}

impl AppState {
    pub fn new(db: SharedDatabase, invoker: AgentInvoker) -> Self {
        Self { db, invoker }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/validations", post(validations::create))
        .route("/api/validations/{id}", get(validations::fetch))
        .route("/api/vc-analysis-progress", get(progress::poll))
        .route("/api/process-agent", post(progress::process_agent))
        .route("/api/analyze-idea", post(idea::analyze))
        .route("/api/improve-idea", post(idea::improve))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
///
/// Liveness plus provider reachability. Always 200: a missing LLM backend
/// degrades the body, it does not take the API down.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let provider = state.invoker.provider();
    let provider_available = provider.health_check().await.unwrap_or(false);

    Json(json!({
        "status": if provider_available { "ok" } else { "degraded" },
        "provider": provider.name(),
        "model": provider.model(),
        "provider_available": provider_available,
    }))
}

/// Bind and serve the API until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
