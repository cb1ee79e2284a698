//! Agent Prompt Construction
//!
//! Builds role-specific prompts from the submitted idea, the structured form
//! attributes, and the accumulated raw outputs of previously-completed
//! agents. Also provides the JSON response schema sent to the provider.

use serde_json::{Map, Value, json};

use super::AgentKind;
use crate::types::Validation;

/// Per-agent analytical focus, rendered as bullet points in the prompt.
fn focus_points(kind: AgentKind) -> &'static [&'static str] {
    match kind {
        AgentKind::Problem => &[
            "What problem does this idea solve, and for whom?",
            "How severe is the pain point on a 1-10 scale (pain_severity)?",
            "Is the problem statement clear, vague, or not identified (clarity_status)?",
        ],
        AgentKind::Market => &[
            "Estimate TAM/SAM/SOM for the target market",
            "Describe the target audience and how reachable it is",
            "Identify current market trends affecting this idea",
        ],
        AgentKind::Competition => &[
            "List the most relevant direct and indirect competitors",
            "Rate the defensibility of the idea's moat as Strong, Moderate, or Weak (moat_status)",
            "What differentiation would survive a funded incumbent copying it?",
        ],
        AgentKind::BusinessModel => &[
            "Identify plausible revenue_streams for this idea",
            "Propose a pricing approach and estimate unit economics",
            "What would break the model at 10x scale?",
        ],
        AgentKind::Team => &[
            "Assess whether the listed team can execute this idea",
            "Identify team_gaps: missing skills or roles",
            "Flag single-founder or key-person risks",
        ],
        AgentKind::Legal => &[
            "Identify legal_risks: licensing, data protection, liability",
            "Are there regulated domains (health, finance, transport) involved?",
            "What compliance work is needed before launch?",
        ],
        AgentKind::Metrics => &[
            "Which growth_indicators should this business track from day one?",
            "Evaluate any growth metrics the founder supplied",
            "Estimate a realistic growth trajectory for the first 18 months",
        ],
        AgentKind::Investor => &[
            "Synthesize the prior analyses into an investment recommendation",
            "State the strongest reason to invest and the strongest reason to pass",
            "Give a clear verdict: Invest, Hold, or Pass, with a one-paragraph summary",
        ],
    }
}

/// Build the full prompt for one agent invocation.
pub fn build_agent_prompt(
    kind: AgentKind,
    validation: &Validation,
    context: &Map<String, Value>,
) -> String {
    let mut prompt = format!(
        "You are a {} on a venture capital diligence team evaluating a startup idea.\n\n\
         ## Business Idea\n{}\n",
        kind.role_title(),
        validation.idea.trim()
    );

    let mut details = String::new();
    push_detail(&mut details, "Business type", &validation.business_type);
    push_detail(&mut details, "Stage", &validation.stage);
    push_detail(&mut details, "Target audience", &validation.target_audience);
    push_detail(&mut details, "Known competitors", &validation.competitors);
    push_detail(&mut details, "Growth metrics", &validation.growth_metrics);
    if !validation.team_members.is_empty() {
        let team: Vec<String> = validation
            .team_members
            .iter()
            .map(|m| {
                if m.skills.is_empty() {
                    m.name.clone()
                } else {
                    format!("{} ({})", m.name, m.skills.join(", "))
                }
            })
            .collect();
        details.push_str(&format!("- Team: {}\n", team.join("; ")));
    }
    if !details.is_empty() {
        prompt.push_str("\n## Founder-Provided Details\n");
        prompt.push_str(&details);
    }

    if !context.is_empty() {
        prompt.push_str("\n## Prior Agent Findings\n");
        prompt.push_str(
            "Earlier specialists produced the following raw analyses. Build on them; \
             do not repeat them.\n\n",
        );
        for (agent, analysis) in context {
            let rendered = serde_json::to_string_pretty(analysis)
                .unwrap_or_else(|_| analysis.to_string());
            prompt.push_str(&format!("### {}\n```json\n{}\n```\n", agent, rendered));
        }
    }

    prompt.push_str("\n## Your Task\n");
    for point in focus_points(kind) {
        prompt.push_str(&format!("- {}\n", point));
    }
    prompt.push_str(
        "\nRespond with a single JSON object matching the schema. \
         `score` is your 0-10 assessment of the idea from your specialty's \
         perspective; fractional scores like 7.5 are encouraged.\n",
    );

    prompt
}

fn push_detail(out: &mut String, label: &str, value: &Option<String>) {
    if let Some(v) = value
        && !v.trim().is_empty()
    {
        out.push_str(&format!("- {}: {}\n", label, v.trim()));
    }
}

/// JSON schema the provider is asked to follow. Kept loose on purpose:
/// sections vary per agent and the normalizer patches gaps downstream.
pub fn response_schema(kind: AgentKind) -> Value {
    json!({
        "type": "object",
        "required": ["score", "reasoning"],
        "properties": {
            "score": {
                "type": "number",
                "minimum": 0,
                "maximum": 10,
                "description": format!("0-10 {} assessment, fractional allowed", kind.as_str())
            },
            "reasoning": {
                "type": "string",
                "description": "Two to four sentences justifying the score"
            },
            "sections": {
                "type": "object",
                "description": "Agent-specific findings keyed by report section"
            }
        }
    })
}

/// Prompt for the pre-check justification produced by `/api/analyze-idea`.
pub fn build_quality_feedback_prompt(idea: &str, score: f64) -> String {
    format!(
        "A founder submitted this startup idea:\n\n{}\n\n\
         A structural pre-check scored it {:.1}/10 for specificity and completeness. \
         In two or three sentences, tell the founder what is strong and what is \
         missing (problem, customer, revenue). Respond with a JSON object: \
         {{\"feedback\": \"...\"}}.",
        idea.trim(),
        score
    )
}

/// Prompt for `/api/improve-idea`.
pub fn build_improve_prompt(idea: &str) -> String {
    format!(
        "Rewrite the following startup idea so it names the problem, the target \
         customer, the solution, and the revenue model explicitly. Keep the \
         founder's intent; add structure, not invention.\n\n\
         Idea:\n{}\n\n\
         Respond with a JSON object: {{\"improved_idea\": \"...\"}}.",
        idea.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn sample_validation() -> Validation {
        Validation {
            id: uuid::Uuid::new_v4(),
            idea: "A marketplace for dog walkers".to_string(),
            business_type: Some("marketplace".to_string()),
            stage: Some("idea".to_string()),
            target_audience: None,
            competitors: None,
            growth_metrics: None,
            status: crate::types::ValidationStatus::Pending,
            created_at: Utc::now(),
            team_members: vec![],
        }
    }

    #[test]
    fn test_prompt_contains_idea_and_role() {
        let prompt = build_agent_prompt(AgentKind::Market, &sample_validation(), &Map::new());
        assert!(prompt.contains("A marketplace for dog walkers"));
        assert!(prompt.contains("Market Research Analyst"));
        assert!(prompt.contains("TAM/SAM/SOM"));
    }

    #[test]
    fn test_prompt_renders_prior_context() {
        let mut context = Map::new();
        context.insert("problem".to_string(), json!({"score": 8.0}));
        let prompt = build_agent_prompt(AgentKind::Investor, &sample_validation(), &context);
        assert!(prompt.contains("Prior Agent Findings"));
        assert!(prompt.contains("### problem"));
    }

    #[test]
    fn test_first_agent_has_no_context_section() {
        let prompt = build_agent_prompt(AgentKind::Problem, &sample_validation(), &Map::new());
        assert!(!prompt.contains("Prior Agent Findings"));
    }

    #[test]
    fn test_schema_requires_score_and_reasoning() {
        let schema = response_schema(AgentKind::Legal);
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, vec!["score", "reasoning"]);
    }
}
