//! Idea Quality Pre-Check
//!
//! Fixed heuristic 0-10 score for a submitted idea, used as a gate before
//! the full pipeline runs. The numeric score is deterministic; only the
//! textual feedback comes from the LLM, and an LLM failure degrades to a
//! canned message rather than an error.

use tracing::warn;

use super::prompts;
use crate::ai::{SharedProvider, first_json_object};
use crate::constants::precheck;

/// Outcome of the pre-check.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IdeaQuality {
    /// Deterministic heuristic score, 0-10 with one decimal
    pub score: f64,
    /// Short textual justification for the founder
    pub feedback: String,
    /// True when the score is below the improve threshold
    pub needs_improvement: bool,
}

/// Signal words the heuristic looks for, grouped by the aspect they cover.
const ASPECTS: &[(&str, &[&str])] = &[
    ("problem", &["problem", "pain", "struggle", "frustrat", "need"]),
    (
        "customer",
        &["customer", "user", "audience", "for people", "businesses", "teams"],
    ),
    (
        "revenue",
        &["revenue", "subscription", "pricing", "charge", "fee", "monetiz", "pay"],
    ),
    (
        "solution",
        &["platform", "app", "service", "marketplace", "tool", "api"],
    ),
];

/// Score idea structure on a fixed heuristic.
///
/// Components: up to 4 points for length/detail, up to 4 for covering the
/// problem/customer/revenue/solution aspects, up to 2 for specificity
/// (numbers or named segments). Rounded to one decimal.
pub fn heuristic_score(idea: &str) -> f64 {
    let trimmed = idea.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let lower = trimmed.to_lowercase();

    let len = trimmed.chars().count();
    let length_points = if len < precheck::MIN_IDEA_LEN {
        1.0 * len as f64 / precheck::MIN_IDEA_LEN as f64
    } else {
        let span = (precheck::FULL_IDEA_LEN - precheck::MIN_IDEA_LEN) as f64;
        let extra = (len - precheck::MIN_IDEA_LEN) as f64;
        1.0 + 3.0 * (extra / span).min(1.0)
    };

    let aspect_hits = ASPECTS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .count();
    let aspect_points = aspect_hits as f64;

    let has_numbers = trimmed.chars().any(|c| c.is_ascii_digit());
    let has_named_segment = lower.contains(" for ") || lower.contains("targeting");
    let specificity_points = match (has_numbers, has_named_segment) {
        (true, true) => 2.0,
        (true, false) | (false, true) => 1.0,
        (false, false) => 0.0,
    };

    let total = length_points + aspect_points + specificity_points;
    (total.clamp(0.0, 10.0) * 10.0).round() / 10.0
}

/// Run the pre-check: heuristic score plus an LLM-written justification.
pub async fn score_idea_quality(provider: &SharedProvider, idea: &str) -> IdeaQuality {
    let score = heuristic_score(idea);

    let prompt = prompts::build_quality_feedback_prompt(idea, score);
    let feedback = match provider.generate(&prompt, &serde_json::Value::Null).await {
        Ok(response) => first_json_object(&response.text)
            .ok()
            .and_then(|v| v.get("feedback").and_then(|f| f.as_str()).map(String::from))
            .unwrap_or_else(|| fallback_feedback(score)),
        Err(e) => {
            warn!("idea feedback generation failed, using fallback: {}", e);
            fallback_feedback(score)
        }
    };

    IdeaQuality {
        score,
        feedback,
        needs_improvement: score < precheck::IMPROVE_THRESHOLD,
    }
}

fn fallback_feedback(score: f64) -> String {
    if score < precheck::IMPROVE_THRESHOLD {
        "The idea is missing structure. Spell out the problem you solve, who pays for the solution, and how revenue is made.".to_string()
    } else {
        "The idea covers the basics. Sharpen it with concrete numbers about the target market and early traction.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_idea_scores_zero() {
        assert_eq!(heuristic_score(""), 0.0);
        assert_eq!(heuristic_score("   "), 0.0);
    }

    #[test]
    fn test_terse_idea_scores_low() {
        let score = heuristic_score("an app");
        assert!(score < precheck::IMPROVE_THRESHOLD, "got {score}");
    }

    #[test]
    fn test_structured_idea_scores_high() {
        let idea = "A subscription marketplace for dog walkers targeting urban pet owners. \
                    The problem: 40% of owners in large cities struggle to find vetted walkers \
                    on short notice. We charge a 15% fee per booking and a monthly subscription \
                    for priority access, serving customers through a mobile app.";
        let score = heuristic_score(idea);
        assert!(score >= 8.0, "got {score}");
    }

    #[test]
    fn test_score_is_deterministic_and_bounded() {
        let idea = "A platform for small businesses";
        assert_eq!(heuristic_score(idea), heuristic_score(idea));
        let long = "revenue pricing customer problem platform for ".repeat(50);
        assert!(heuristic_score(&long) <= 10.0);
    }
}
