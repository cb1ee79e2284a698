//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! No raw internal error crosses the API boundary: everything becomes a
//! structured JSON body with an HTTP status, and internal details are only
//! logged.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::types::VentureError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("upstream provider error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(VentureError),
}

impl From<VentureError> for ApiError {
    fn from(err: VentureError) -> Self {
        match err {
            VentureError::NotFound(m) => ApiError::NotFound(m),
            VentureError::Validation(m) => ApiError::BadRequest(m),
            VentureError::LlmApi(m) => ApiError::Upstream(m),
            VentureError::AgentInvocation { .. } | VentureError::MalformedResponse { .. } => {
                ApiError::Upstream(err.to_string())
            }
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
            ApiError::Internal(e) => {
                error!("internal error in API handler: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            ApiError::from(VentureError::NotFound("validation x".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(VentureError::Validation("empty idea".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(VentureError::agent_invocation("market", "timeout")),
            ApiError::Upstream(_)
        ));
        assert!(matches!(
            ApiError::from(VentureError::Storage("pool exhausted".into())),
            ApiError::Internal(_)
        ));
    }
}
