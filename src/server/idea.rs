//! Idea pre-check and improvement handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{AppState, error::ApiError};
use crate::agents::{IdeaQuality, prompts, score_idea_quality};
use crate::ai::first_json_object;

#[derive(Debug, Deserialize)]
pub struct IdeaRequest {
    pub idea: String,
}

/// POST /api/analyze-idea
///
/// Deterministic heuristic score plus LLM-written feedback. Provider
/// failures degrade to canned feedback inside the scorer, so this handler
/// only rejects empty input.
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<IdeaRequest>,
) -> Result<Json<IdeaQuality>, ApiError> {
    if req.idea.trim().is_empty() {
        return Err(ApiError::BadRequest("idea must not be empty".to_string()));
    }

    let quality = score_idea_quality(state.invoker.provider(), &req.idea).await;
    Ok(Json(quality))
}

/// POST /api/improve-idea
///
/// Rewrites a weak idea into a structured pitch. Unlike the pre-check this
/// has no useful degraded mode, so provider failures surface as errors.
pub async fn improve(
    State(state): State<AppState>,
    Json(req): Json<IdeaRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.idea.trim().is_empty() {
        return Err(ApiError::BadRequest("idea must not be empty".to_string()));
    }

    let prompt = prompts::build_improve_prompt(&req.idea);
    let response = state
        .invoker
        .provider()
        .generate(&prompt, &Value::Null)
        .await?;

    let improved = first_json_object(&response.text)
        .ok()
        .and_then(|v| {
            v.get("improved_idea")
                .and_then(|s| s.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| response.text.trim().to_string());

    Ok(Json(json!({ "improvedIdea": improved })))
}
