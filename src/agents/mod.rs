//! Multi-Agent Validation Pipeline
//!
//! Eight specialized analysis agents run in a fixed order against one
//! submitted business idea. Each agent sees the accumulated raw outputs of
//! the agents before it.
//!
//! ## Modules
//!
//! - `sequencer`: next-agent selection and the validation phase state machine
//! - `invoker`: single-agent invocation against the LLM provider
//! - `aggregator`: weighted overall score and category breakdown
//! - `prompts`: role prompts and response schemas
//! - `quality`: heuristic idea quality pre-check

pub mod aggregator;
pub mod invoker;
pub mod prompts;
pub mod quality;
pub mod sequencer;

pub use aggregator::{ScoreSummary, aggregate_scores};
pub use invoker::{AgentInvoker, AgentOutcome};
pub use quality::{IdeaQuality, score_idea_quality};
pub use sequencer::{ValidationPhase, next_agent};

use serde::{Deserialize, Serialize};

/// One specialized LLM-backed analysis step in the fixed 8-step sequence.
/// Declaration order is the processing order, so the derived Ord matches
/// the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Problem,
    Market,
    Competition,
    BusinessModel,
    Team,
    Legal,
    Metrics,
    Investor,
}

/// Display category an agent's score contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    Market,
    Team,
    Investment,
}

impl AgentCategory {
    pub const ALL: [AgentCategory; 3] = [Self::Market, Self::Team, Self::Investment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Team => "team",
            Self::Investment => "investment",
        }
    }
}

impl AgentKind {
    /// The fixed processing order. The sequencer walks this list.
    pub const SEQUENCE: [AgentKind; 8] = [
        Self::Problem,
        Self::Market,
        Self::Competition,
        Self::BusinessModel,
        Self::Team,
        Self::Legal,
        Self::Metrics,
        Self::Investor,
    ];

    /// Wire/storage identifier for this agent kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Problem => "problem",
            Self::Market => "market",
            Self::Competition => "competition",
            Self::BusinessModel => "business_model",
            Self::Team => "team",
            Self::Legal => "legal",
            Self::Metrics => "metrics",
            Self::Investor => "investor",
        }
    }

    /// Parse a stored identifier. Unknown identifiers return None and are
    /// skipped by callers, which is how schema drift in stored rows is
    /// ignored for ordering purposes.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "problem" => Some(Self::Problem),
            "market" => Some(Self::Market),
            "competition" => Some(Self::Competition),
            "business_model" => Some(Self::BusinessModel),
            "team" => Some(Self::Team),
            "legal" => Some(Self::Legal),
            "metrics" => Some(Self::Metrics),
            "investor" => Some(Self::Investor),
            _ => None,
        }
    }

    /// Fixed aggregation weight, range 0.8-1.5.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Problem => 1.2,
            Self::Market => 1.5,
            Self::Competition => 1.0,
            Self::BusinessModel => 1.3,
            Self::Team => 1.1,
            Self::Legal => 0.8,
            Self::Metrics => 1.0,
            Self::Investor => 1.4,
        }
    }

    /// Display category for the score breakdown.
    pub fn category(&self) -> AgentCategory {
        match self {
            Self::Problem | Self::Market | Self::Competition => AgentCategory::Market,
            Self::Team | Self::Legal => AgentCategory::Team,
            Self::BusinessModel | Self::Metrics | Self::Investor => AgentCategory::Investment,
        }
    }

    /// Human-readable role title used in prompts and the rendered report.
    pub fn role_title(&self) -> &'static str {
        match self {
            Self::Problem => "Problem Analyst",
            Self::Market => "Market Research Analyst",
            Self::Competition => "Competitive Landscape Analyst",
            Self::BusinessModel => "Business Model Analyst",
            Self::Team => "Team Assessment Analyst",
            Self::Legal => "Legal & Compliance Analyst",
            Self::Metrics => "Growth Metrics Analyst",
            Self::Investor => "Venture Capital Partner",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
