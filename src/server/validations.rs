//! Validation submission and retrieval handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use uuid::Uuid;

use super::{AppState, error::ApiError};
use crate::types::{NewValidation, Validation};

/// POST /api/validations
///
/// Persists the submitted form and returns the created validation. No
/// agent runs yet; the client starts the pipeline through the progress
/// endpoint.
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<NewValidation>,
) -> Result<Json<Validation>, ApiError> {
    let validation = state.db.insert_validation(&form)?;
    Ok(Json(validation))
}

/// GET /api/validations/{id}
///
/// The full picture for one validation: the form, every stored agent
/// analysis, and the report when it exists.
pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let validation = state
        .db
        .get_validation(id)?
        .ok_or_else(|| ApiError::NotFound(format!("validation {id}")))?;

    let analyses = state.db.list_analyses(id)?;
    let report = state.db.get_report(id)?;

    Ok(Json(json!({
        "validation": validation,
        "analyses": analyses,
        "report": report.as_ref().map(|(data, _)| data.clone()),
        "overall_score": report.map(|(_, score)| score),
    })))
}
