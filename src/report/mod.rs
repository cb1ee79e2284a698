//! Investor Report Assembly
//!
//! Once all eight agents complete, their raw analyses are folded into the
//! denormalized report document the client renders. The assembled report
//! always passes through the normalizer before it is returned or persisted.

pub mod normalizer;

pub use normalizer::{canonical_keys, normalize};

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::agents::{AgentKind, ScoreSummary, aggregate_scores};
use crate::types::{AgentAnalysis, Validation};

/// Assemble the final report from completed agent analyses.
///
/// Agents that failed or produced no analysis contribute nothing; the
/// normalizer substitutes their sections' defaults.
pub fn assemble(validation: &Validation, analyses: &[AgentAnalysis]) -> (Value, ScoreSummary) {
    let by_agent: BTreeMap<AgentKind, &AgentAnalysis> = analyses
        .iter()
        .filter(|a| a.is_completed())
        .map(|a| (a.agent, a))
        .collect();

    let scores: BTreeMap<AgentKind, f64> = by_agent
        .iter()
        .filter_map(|(&kind, a)| a.score.map(|s| (kind, s)))
        .collect();
    let summary = aggregate_scores(&scores);

    let mut report = Map::new();

    for (&kind, analysis) in &by_agent {
        let Some(body) = analysis.analysis.as_ref() else {
            continue;
        };

        let section_key = primary_section_key(kind);
        report.insert(section_key.to_string(), section_body(body));

        for &field in lifted_fields(kind) {
            if let Some(value) = pick_field(body, field) {
                report.insert(field.to_string(), value);
            }
        }

        if kind == AgentKind::Investor {
            report.insert(
                "recommendation".to_string(),
                build_recommendation(body, analysis),
            );
        }
    }

    report.insert(
        "scores".to_string(),
        json!({
            "overall_score": summary.overall_score,
            "weighted_scores": summary.weighted_scores,
            "category_scores": summary.category_scores,
            "idea": validation.idea,
        }),
    );

    (normalize(&Value::Object(report)), summary)
}

/// The report key an agent's section body lands under.
fn primary_section_key(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Problem => "problem",
        AgentKind::Market => "market",
        AgentKind::Competition => "competition",
        AgentKind::BusinessModel => "business_model",
        AgentKind::Team => "team",
        AgentKind::Legal => "legal",
        AgentKind::Metrics => "metrics",
        // The investor agent feeds `recommendation`, handled separately;
        // its raw body still lands here so nothing is lost.
        AgentKind::Investor => "recommendation_detail",
    }
}

/// Top-level report fields lifted out of an agent's response body.
fn lifted_fields(kind: AgentKind) -> &'static [&'static str] {
    match kind {
        AgentKind::Problem => &["clarity_status", "pain_severity"],
        AgentKind::Market => &["market_size", "audience"],
        AgentKind::Competition => &["competitors", "moat_status"],
        AgentKind::BusinessModel => &["revenue_streams", "pricing"],
        AgentKind::Team => &["team_gaps"],
        AgentKind::Legal => &["legal_risks"],
        AgentKind::Metrics => &["growth_indicators"],
        AgentKind::Investor => &[],
    }
}

/// An agent's section body: its `sections` object when present, otherwise
/// the response minus the scoring envelope.
fn section_body(body: &Value) -> Value {
    if let Some(Value::Object(sections)) = body.get("sections") {
        return Value::Object(sections.clone());
    }

    match body {
        Value::Object(m) => {
            let mut stripped = m.clone();
            stripped.remove("score");
            stripped.remove("reasoning");
            Value::Object(stripped)
        }
        _ => json!({}),
    }
}

/// Look for a lifted field at the response top level, then inside
/// `sections`.
fn pick_field(body: &Value, field: &str) -> Option<Value> {
    if let Some(v) = body.get(field)
        && !v.is_null()
    {
        return Some(v.clone());
    }
    if let Some(v) = body.get("sections").and_then(|s| s.get(field))
        && !v.is_null()
    {
        return Some(v.clone());
    }
    None
}

fn build_recommendation(body: &Value, analysis: &AgentAnalysis) -> Value {
    let summary = body
        .get("sections")
        .and_then(|s| s.get("summary"))
        .and_then(|v| v.as_str())
        .map(String::from)
        .or_else(|| analysis.reasoning.clone())
        .unwrap_or_default();

    let verdict = pick_field(body, "verdict")
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_else(|| "Hold".to_string());

    json!({
        "summary": summary,
        "verdict": verdict,
        "score": analysis.score,
    })
}
