//! Score Aggregator
//!
//! Combines per-agent scores into an overall weighted score and an
//! unweighted per-category breakdown for display. Pure; persistence is the
//! caller's responsibility.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{AgentCategory, AgentKind};
use crate::constants::scoring;

/// Aggregated scoring output.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    /// Weighted average over agents with a numeric score, 0-10
    pub overall_score: f64,
    /// Per-agent weighted contribution (score x weight)
    pub weighted_scores: BTreeMap<String, f64>,
    /// Per-category unweighted mean, rounded to the nearest integer
    pub category_scores: BTreeMap<String, i64>,
}

/// Aggregate the scores of completed agents.
///
/// Agents without a numeric score are excluded from both numerator and
/// denominator. With zero scored agents the overall score falls back to the
/// neutral midpoint rather than dividing by zero.
pub fn aggregate_scores(scores: &BTreeMap<AgentKind, f64>) -> ScoreSummary {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut weighted_scores = BTreeMap::new();
    let mut category_members: BTreeMap<AgentCategory, Vec<f64>> = BTreeMap::new();

    for (&kind, &score) in scores {
        let weight = kind.weight();
        weighted_sum += score * weight;
        weight_sum += weight;
        weighted_scores.insert(kind.as_str().to_string(), score * weight);
        category_members.entry(kind.category()).or_default().push(score);
    }

    let overall_score = if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        scoring::NEUTRAL_OVERALL_SCORE
    };

    let category_scores = category_members
        .into_iter()
        .map(|(category, members)| {
            let mean = members.iter().sum::<f64>() / members.len() as f64;
            (category.as_str().to_string(), mean.round() as i64)
        })
        .collect();

    ScoreSummary {
        overall_score,
        weighted_scores,
        category_scores,
    }
}
