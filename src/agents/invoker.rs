//! Single-Agent Invoker
//!
//! Produces exactly one agent outcome: build the role prompt, call the
//! provider, extract the JSON object from the response, pull out score and
//! reasoning. Network failures and malformed responses are reported as
//! distinct errors; both leave the agent unfinished for the next poll cycle
//! to retry.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{AgentKind, prompts};
use crate::ai::{SharedProvider, first_json_object};
use crate::constants::scoring;
use crate::types::{Result, Validation, VentureError};

/// Result of one successful agent invocation.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// 0-10 assessment; fractional values are preserved
    pub score: f64,
    pub reasoning: String,
    /// Full raw parsed response object
    pub analysis: Value,
}

/// Invokes individual agents against the configured LLM provider.
#[derive(Clone)]
pub struct AgentInvoker {
    provider: SharedProvider,
}

impl AgentInvoker {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    /// Run one agent. `context` maps previously-completed agent kinds to
    /// their raw analysis objects; it is empty for the first agent.
    pub async fn invoke(
        &self,
        kind: AgentKind,
        validation: &Validation,
        context: &Map<String, Value>,
    ) -> Result<AgentOutcome> {
        let prompt = prompts::build_agent_prompt(kind, validation, context);
        let schema = prompts::response_schema(kind);

        info!(agent = %kind, provider = self.provider.name(), "invoking agent");

        let response = self
            .provider
            .generate(&prompt, &schema)
            .await
            .map_err(|e| VentureError::agent_invocation(kind.as_str(), e.to_string()))?;

        debug!(
            agent = %kind,
            provider = %response.metadata.provider,
            model = %response.metadata.model,
            tokens = response.usage.total(),
            elapsed_ms = response.timing.total_ms,
            "agent response received"
        );

        let analysis = first_json_object(&response.text)
            .map_err(|e| VentureError::malformed_response(kind.as_str(), e.to_string()))?;

        let score = extract_score(&analysis).ok_or_else(|| {
            VentureError::malformed_response(
                kind.as_str(),
                "response has no numeric 'score' field".to_string(),
            )
        })?;

        let reasoning = analysis
            .get("reasoning")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(AgentOutcome {
            score,
            reasoning,
            analysis,
        })
    }
}

/// Pull the score out of a response object, clamped to the valid range.
/// Accepts numbers or numeric strings; anything else is treated as absent.
fn extract_score(analysis: &Value) -> Option<f64> {
    let raw = match analysis.get("score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    if raw.is_finite() {
        Some(raw.clamp(scoring::MIN_SCORE, scoring::MAX_SCORE))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_fractional_score() {
        assert_eq!(extract_score(&json!({"score": 7.5})), Some(7.5));
    }

    #[test]
    fn test_extract_score_from_string() {
        assert_eq!(extract_score(&json!({"score": "6.8"})), Some(6.8));
    }

    #[test]
    fn test_score_clamped_to_range() {
        assert_eq!(extract_score(&json!({"score": 14.0})), Some(10.0));
        assert_eq!(extract_score(&json!({"score": -3})), Some(0.0));
    }

    #[test]
    fn test_missing_or_bogus_score() {
        assert_eq!(extract_score(&json!({"reasoning": "fine"})), None);
        assert_eq!(extract_score(&json!({"score": {"value": 5}})), None);
        assert_eq!(extract_score(&json!({"score": "excellent"})), None);
    }
}
