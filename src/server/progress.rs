//! Progress polling and background agent processing.
//!
//! The poll handler is the pipeline's engine: each poll with
//! `triggerNext=true` claims at most one agent, spawns its invocation in
//! the background, and returns immediately. The durable claim row (not
//! in-process state) is what makes concurrent polls idempotent, so a
//! restarted server picks up exactly where the stored rows say it left
//! off.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{AppState, error::ApiError};
use crate::agents::{
    AgentInvoker, AgentKind,
    sequencer::{self, ValidationPhase},
};
use crate::report;
use crate::storage::SharedDatabase;
use crate::types::{AgentAnalysis, Validation, ValidationStatus};

#[derive(Debug, Deserialize)]
pub struct ProgressParams {
    pub id: Uuid,
    #[serde(default, rename = "triggerNext")]
    pub trigger_next: bool,
}

/// GET /api/vc-analysis-progress
///
/// Without `triggerNext` this is a pure read. With it, the handler either
/// claims and spawns the next agent, or assembles and stores the report
/// once every agent has completed.
pub async fn poll(
    State(state): State<AppState>,
    Query(params): Query<ProgressParams>,
) -> Result<Json<Value>, ApiError> {
    let validation = state
        .db
        .get_validation(params.id)?
        .ok_or_else(|| ApiError::NotFound(format!("validation {}", params.id)))?;

    let analyses = state.db.list_analyses(params.id)?;
    let phase = sequencer::phase(&analyses);

    let (validation, analyses, phase) = if params.trigger_next {
        advance(&state, &validation, &analyses, phase)?;

        // Reload so the claim or finalize above is visible in this
        // response rather than only on the next poll.
        let validation = state
            .db
            .get_validation(params.id)?
            .ok_or_else(|| ApiError::NotFound(format!("validation {}", params.id)))?;
        let analyses = state.db.list_analyses(params.id)?;
        let phase = sequencer::phase(&analyses);
        (validation, analyses, phase)
    } else {
        (validation, analyses, phase)
    };

    let report = state.db.get_report(params.id)?;

    Ok(Json(json!({
        "validation": validation,
        "phase": phase,
        "analyses": analyses,
        "report": report.as_ref().map(|(data, _)| data.clone()),
        "overall_score": report.map(|(_, score)| score),
    })))
}

/// Move the pipeline forward by one step.
fn advance(
    state: &AppState,
    validation: &Validation,
    analyses: &[AgentAnalysis],
    phase: ValidationPhase,
) -> Result<(), ApiError> {
    if phase == ValidationPhase::AllComplete {
        // Assemble once; later polls reuse the stored report.
        if state.db.get_report(validation.id)?.is_none() {
            let (report, summary) = report::assemble(validation, analyses);
            state
                .db
                .store_report(validation.id, &report, summary.overall_score)?;
            info!(
                validation = %validation.id,
                overall_score = summary.overall_score,
                "investor report assembled"
            );
        }
        if validation.status != ValidationStatus::Completed {
            state
                .db
                .set_validation_status(validation.id, ValidationStatus::Completed)?;
        }
        return Ok(());
    }

    let completed: HashSet<AgentKind> = analyses
        .iter()
        .filter(|a| a.is_completed())
        .map(|a| a.agent)
        .collect();
    let Some(next) = sequencer::next_agent(&completed) else {
        return Ok(());
    };

    let context = accumulated_context(analyses);
    if !state
        .db
        .claim_agent(validation.id, next, &Value::Object(context.clone()))?
    {
        // An earlier poll already owns this agent.
        return Ok(());
    }

    if validation.status == ValidationStatus::Pending {
        state
            .db
            .set_validation_status(validation.id, ValidationStatus::Processing)?;
    }

    spawn_agent(
        state.db.clone(),
        state.invoker.clone(),
        validation.clone(),
        next,
        context,
    );
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessAgentRequest {
    pub validation_id: Uuid,
    pub agent_type: String,
    #[serde(default)]
    pub business_idea: Option<String>,
    #[serde(default)]
    pub additional_context: Option<Value>,
}

/// POST /api/process-agent
///
/// Fire-and-forget trigger for one specific agent. The claim is persisted
/// before this returns; the invocation runs in the background, so
/// `success: true` means the agent was accepted, not that it finished.
pub async fn process_agent(
    State(state): State<AppState>,
    Json(req): Json<ProcessAgentRequest>,
) -> Result<Json<Value>, ApiError> {
    let kind = AgentKind::parse(&req.agent_type)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown agent type '{}'", req.agent_type)))?;

    let mut validation = state
        .db
        .get_validation(req.validation_id)?
        .ok_or_else(|| ApiError::NotFound(format!("validation {}", req.validation_id)))?;

    // The caller may resubmit a refined idea for this one invocation
    // without mutating the stored form.
    if let Some(idea) = req.business_idea
        && !idea.trim().is_empty()
    {
        validation.idea = idea;
    }

    let analyses = state.db.list_analyses(req.validation_id)?;
    let context = match req.additional_context {
        Some(Value::Object(map)) => map,
        _ => accumulated_context(&analyses),
    };

    if !state
        .db
        .claim_agent(req.validation_id, kind, &Value::Object(context.clone()))?
    {
        return Ok(Json(json!({
            "success": true,
            "message": format!("{kind} agent already processing or completed"),
        })));
    }

    if validation.status == ValidationStatus::Pending {
        state
            .db
            .set_validation_status(req.validation_id, ValidationStatus::Processing)?;
    }

    spawn_agent(
        state.db.clone(),
        state.invoker.clone(),
        validation,
        kind,
        context,
    );

    Ok(Json(json!({
        "success": true,
        "message": format!("{kind} agent started"),
    })))
}

/// Run one agent in the background. The claim row is already persisted, so
/// the outcome (or failure) always lands on an existing row, and a crash
/// here leaves a reclaimable `processing` row rather than losing the step.
fn spawn_agent(
    db: SharedDatabase,
    invoker: AgentInvoker,
    validation: Validation,
    kind: AgentKind,
    context: Map<String, Value>,
) {
    tokio::spawn(async move {
        match invoker.invoke(kind, &validation, &context).await {
            Ok(outcome) => {
                info!(agent = %kind, score = outcome.score, "agent completed");
                if let Err(e) = db.complete_agent(validation.id, kind, &outcome) {
                    error!(agent = %kind, "failed to persist agent outcome: {}", e);
                }
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!(agent = %kind, "agent invocation failed, next poll retries: {}", e);
                } else {
                    error!(agent = %kind, "agent invocation failed: {}", e);
                }
                if let Err(e) = db.fail_agent(validation.id, kind) {
                    error!(agent = %kind, "failed to mark agent failed: {}", e);
                }
            }
        }
    });
}

/// Merge the raw outputs of completed agents, keyed by agent identifier.
/// This is the context object each later agent receives.
pub(crate) fn accumulated_context(analyses: &[AgentAnalysis]) -> Map<String, Value> {
    let mut context = Map::new();
    for analysis in analyses.iter().filter(|a| a.is_completed()) {
        if let Some(body) = &analysis.analysis {
            context.insert(analysis.agent.as_str().to_string(), body.clone());
        }
    }
    context
}
