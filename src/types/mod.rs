//! Core Domain Types
//!
//! Entities shared across the agent pipeline, storage, and the HTTP API:
//! validations (submitted ideas), team members, and per-agent analyses.

pub mod error;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use error::{Result, ResultExt, VentureError};

use crate::agents::AgentKind;

// =============================================================================
// Statuses
// =============================================================================

/// Lifecycle status of a validation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pending,
    Processing,
    Completed,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing status of a single agent analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// Placeholder row claimed before the invocation starts
    Processing,
    Completed,
    /// Invocation or parsing failed; reclaimable by the next poll
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Validation Form
// =============================================================================

/// One member of the founding team, owned by a validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Payload for creating a new validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewValidation {
    pub idea: String,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub competitors: Option<String>,
    #[serde(default)]
    pub growth_metrics: Option<String>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
}

impl NewValidation {
    /// Reject empty submissions before they reach the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.idea.trim().is_empty() {
            return Err(VentureError::Validation(
                "business idea must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A stored validation session, immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    pub id: Uuid,
    pub idea: String,
    pub business_type: Option<String>,
    pub stage: Option<String>,
    pub target_audience: Option<String>,
    pub competitors: Option<String>,
    pub growth_metrics: Option<String>,
    pub status: ValidationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
}

// =============================================================================
// Agent Analysis
// =============================================================================

/// One record per (validation, agent kind) pair.
///
/// `score` is stored as SQL REAL and read back as f64, so fractional values
/// like 7.5 round-trip exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAnalysis {
    pub validation_id: Uuid,
    pub agent: AgentKind,
    /// Raw prompt context given to the agent (accumulated prior outputs)
    pub input_context: Value,
    /// Raw parsed JSON response; None while processing or failed
    pub analysis: Option<Value>,
    pub score: Option<f64>,
    pub reasoning: Option<String>,
    pub status: AnalysisStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentAnalysis {
    pub fn is_completed(&self) -> bool {
        self.status == AnalysisStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in ["processing", "completed", "failed"] {
            assert_eq!(AnalysisStatus::parse(status).unwrap().as_str(), status);
        }
        assert!(AnalysisStatus::parse("queued").is_none());
    }

    #[test]
    fn test_empty_idea_rejected() {
        let form = NewValidation {
            idea: "   ".to_string(),
            business_type: None,
            stage: None,
            target_audience: None,
            competitors: None,
            growth_metrics: None,
            team_members: vec![],
        };
        assert!(form.validate().is_err());
    }
}
