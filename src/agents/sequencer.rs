//! Agent Sequencer
//!
//! Pure functions over the fixed agent order: which agent runs next, and
//! which phase a validation is in. Persistence of the "processing"
//! placeholder is the caller's responsibility, before any invocation is
//! spawned, so concurrent polls are idempotent.

use std::collections::HashSet;

use serde::Serialize;

use super::AgentKind;
use crate::types::{AgentAnalysis, AnalysisStatus};

/// Explicit progress state for one validation, computed from stored
/// analyses. Replaces implicit wall-clock polling state on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "agent", rename_all = "snake_case")]
pub enum ValidationPhase {
    /// No agent has been claimed yet
    NotStarted,
    /// At least one agent remains; the named one is next (or in flight)
    AgentPending(AgentKind),
    /// All eight agents completed; the report can be assembled
    AllComplete,
    /// Every remaining agent attempt has failed and nothing is in flight
    Failed,
}

/// Return the first agent in the fixed order not present in `completed`,
/// or None when the completed set covers the whole sequence.
pub fn next_agent(completed: &HashSet<AgentKind>) -> Option<AgentKind> {
    AgentKind::SEQUENCE
        .iter()
        .copied()
        .find(|kind| !completed.contains(kind))
}

/// Compute the phase of a validation from its stored agent analyses.
pub fn phase(analyses: &[AgentAnalysis]) -> ValidationPhase {
    let completed: HashSet<AgentKind> = analyses
        .iter()
        .filter(|a| a.status == AnalysisStatus::Completed)
        .map(|a| a.agent)
        .collect();

    match next_agent(&completed) {
        None => ValidationPhase::AllComplete,
        Some(next) => {
            if analyses.is_empty() {
                ValidationPhase::NotStarted
            } else if analyses.iter().all(|a| a.status == AnalysisStatus::Failed) {
                // Rows exist but every one is a dead attempt; the next poll
                // with triggerNext reclaims the first failed row.
                ValidationPhase::Failed
            } else {
                ValidationPhase::AgentPending(next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn analysis(agent: AgentKind, status: AnalysisStatus) -> AgentAnalysis {
        AgentAnalysis {
            validation_id: uuid::Uuid::new_v4(),
            agent,
            input_context: json!({}),
            analysis: None,
            score: None,
            reasoning: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_set_yields_first_agent() {
        assert_eq!(next_agent(&HashSet::new()), Some(AgentKind::Problem));
    }

    #[test]
    fn test_order_is_respected_for_any_subset() {
        // For every prefix of the sequence marked complete, the next agent
        // is the element right after the prefix.
        for n in 0..AgentKind::SEQUENCE.len() {
            let completed: HashSet<_> = AgentKind::SEQUENCE[..n].iter().copied().collect();
            assert_eq!(next_agent(&completed), Some(AgentKind::SEQUENCE[n]));
        }
    }

    #[test]
    fn test_gaps_are_filled_in_order() {
        // market done but problem not: problem still runs first
        let completed: HashSet<_> = [AgentKind::Market, AgentKind::Legal].into_iter().collect();
        assert_eq!(next_agent(&completed), Some(AgentKind::Problem));
    }

    #[test]
    fn test_full_set_is_terminal() {
        let completed: HashSet<_> = AgentKind::SEQUENCE.into_iter().collect();
        assert_eq!(next_agent(&completed), None);
    }

    #[test]
    fn test_phase_not_started() {
        assert_eq!(phase(&[]), ValidationPhase::NotStarted);
    }

    #[test]
    fn test_phase_pending_while_processing() {
        let rows = vec![analysis(AgentKind::Problem, AnalysisStatus::Processing)];
        assert_eq!(
            phase(&rows),
            ValidationPhase::AgentPending(AgentKind::Problem)
        );
    }

    #[test]
    fn test_phase_advances_past_completed() {
        let rows = vec![analysis(AgentKind::Problem, AnalysisStatus::Completed)];
        assert_eq!(
            phase(&rows),
            ValidationPhase::AgentPending(AgentKind::Market)
        );
    }

    #[test]
    fn test_phase_all_complete() {
        let rows: Vec<_> = AgentKind::SEQUENCE
            .into_iter()
            .map(|k| analysis(k, AnalysisStatus::Completed))
            .collect();
        assert_eq!(phase(&rows), ValidationPhase::AllComplete);
    }

    #[test]
    fn test_phase_failed_when_all_attempts_dead() {
        let rows = vec![analysis(AgentKind::Problem, AnalysisStatus::Failed)];
        assert_eq!(phase(&rows), ValidationPhase::Failed);
    }
}
