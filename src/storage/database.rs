//! Database Layer with Connection Pooling
//!
//! SQLite database layer featuring:
//! - Connection pooling via r2d2 for concurrent access
//! - WAL mode for read/write performance
//! - The storage-level claim that makes concurrent agent triggers idempotent
//!
//! Scores are stored as REAL and read back as f64, so fractional values
//! round-trip exactly.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde_json::Value;
use uuid::Uuid;

use crate::agents::{AgentKind, AgentOutcome};
use crate::types::{
    AgentAnalysis, AnalysisStatus, NewValidation, Result, ResultExt, TeamMember, Validation,
    ValidationStatus, VentureError,
};

/// Shared database handle for async contexts.
pub type SharedDatabase = Arc<Database>;

const SCHEMA: &str = include_str!("schema.sql");

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_size: u32,
    /// Minimum idle connections to keep ready
    pub min_idle: u32,
    /// Timeout for acquiring a connection (seconds)
    pub connection_timeout_secs: u64,
}

impl PoolConfig {
    const MIN_POOL_SIZE: u32 = 4;
    const MAX_POOL_SIZE: u32 = 32;

    /// clamp(cores * 2, MIN, MAX): two connections per core with bounds.
    pub fn optimal_pool_size() -> u32 {
        let cores = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        (cores * 2).clamp(Self::MIN_POOL_SIZE, Self::MAX_POOL_SIZE)
    }

    /// Create config with automatic pool sizing based on CPU cores.
    pub fn auto() -> Self {
        let max_size = Self::optimal_pool_size();
        Self {
            max_size,
            min_idle: (max_size / 4).max(2),
            connection_timeout_secs: 30,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::auto()
    }
}

/// Thread-safe database with connection pooling.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open database with connection pooling at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, PoolConfig::default())
    }

    /// Open database with custom pool configuration.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PoolConfig) -> Result<Self> {
        let manager =
            SqliteConnectionManager::file(path.as_ref()).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle))
            .connection_timeout(std::time::Duration::from_secs(
                config.connection_timeout_secs,
            ))
            .build(manager)
            .map_err(|e| VentureError::Storage(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.initialize()?;
        Ok(db)
    }

    /// Open an in-memory database for testing or temporary use.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        // A single connection keeps every caller on the same in-memory db.
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| VentureError::Storage(format!("Failed to create in-memory pool: {}", e)))?;

        let db = Self { pool };
        db.initialize()?;
        Ok(db)
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;
        Ok(())
    }

    /// Get a connection from the pool.
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            VentureError::Storage(format!("Failed to acquire database connection: {}", e))
        })
    }

    /// Initialize database schema.
    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)
            .with_context("Failed to initialize database schema")?;
        Ok(())
    }

    // =========================================================================
    // Validations
    // =========================================================================

    /// Insert a new validation form with its team members, in one
    /// transaction.
    pub fn insert_validation(&self, form: &NewValidation) -> Result<Validation> {
        form.validate()?;

        let id = Uuid::new_v4();
        let created_at = Utc::now();

        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .with_context("Failed to begin transaction")?;

        tx.execute(
            "INSERT INTO validations
                 (id, idea, business_type, stage, target_audience, competitors,
                  growth_metrics, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id.to_string(),
                form.idea,
                form.business_type,
                form.stage,
                form.target_audience,
                form.competitors,
                form.growth_metrics,
                ValidationStatus::Pending.as_str(),
                created_at.to_rfc3339(),
            ],
        )?;

        for member in &form.team_members {
            tx.execute(
                "INSERT INTO team_members (validation_id, name, skills) VALUES (?1, ?2, ?3)",
                params![
                    id.to_string(),
                    member.name,
                    serde_json::to_string(&member.skills)?,
                ],
            )?;
        }

        tx.commit().with_context("Failed to commit validation")?;

        Ok(Validation {
            id,
            idea: form.idea.clone(),
            business_type: form.business_type.clone(),
            stage: form.stage.clone(),
            target_audience: form.target_audience.clone(),
            competitors: form.competitors.clone(),
            growth_metrics: form.growth_metrics.clone(),
            status: ValidationStatus::Pending,
            created_at,
            team_members: form.team_members.clone(),
        })
    }

    /// Fetch a validation with its team members.
    pub fn get_validation(&self, id: Uuid) -> Result<Option<Validation>> {
        let conn = self.conn()?;

        let validation = conn
            .query_row(
                "SELECT id, idea, business_type, stage, target_audience, competitors,
                        growth_metrics, status, created_at
                 FROM validations WHERE id = ?1",
                params![id.to_string()],
                Self::row_to_validation,
            )
            .optional()?;

        let Some(mut validation) = validation else {
            return Ok(None);
        };

        let mut stmt =
            conn.prepare("SELECT name, skills FROM team_members WHERE validation_id = ?1 ORDER BY id")?;
        let members = stmt.query_map(params![id.to_string()], |row| {
            let name: String = row.get(0)?;
            let skills_json: String = row.get(1)?;
            Ok((name, skills_json))
        })?;

        for member in members {
            let (name, skills_json) = member?;
            let skills: Vec<String> = serde_json::from_str(&skills_json).unwrap_or_default();
            validation.team_members.push(TeamMember { name, skills });
        }

        Ok(Some(validation))
    }

    /// Update validation lifecycle status.
    pub fn set_validation_status(&self, id: Uuid, status: ValidationStatus) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE validations SET status = ?2 WHERE id = ?1",
            params![id.to_string(), status.as_str()],
        )?;
        if changed == 0 {
            return Err(VentureError::NotFound(format!("validation {id}")));
        }
        Ok(())
    }

    fn row_to_validation(row: &Row<'_>) -> rusqlite::Result<Validation> {
        let id_str: String = row.get(0)?;
        let status_str: String = row.get(7)?;
        let created_str: String = row.get(8)?;

        Ok(Validation {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            idea: row.get(1)?,
            business_type: row.get(2)?,
            stage: row.get(3)?,
            target_audience: row.get(4)?,
            competitors: row.get(5)?,
            growth_metrics: row.get(6)?,
            status: ValidationStatus::parse(&status_str).unwrap_or(ValidationStatus::Pending),
            created_at: parse_timestamp(&created_str),
            team_members: Vec::new(),
        })
    }

    // =========================================================================
    // Agent Analyses
    // =========================================================================

    /// Claim an agent slot by inserting a durable `processing` placeholder.
    ///
    /// Returns true when the claim succeeded (fresh insert, or reclaim of a
    /// failed attempt). A slot that is already processing or completed is
    /// not reclaimed, which makes near-simultaneous triggers idempotent:
    /// the loser of the race gets false and does nothing.
    pub fn claim_agent(
        &self,
        validation_id: Uuid,
        agent: AgentKind,
        input_context: &Value,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let changed = conn.execute(
            "INSERT INTO agent_analyses
                 (validation_id, agent_kind, input_context, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'processing', ?4, ?4)
             ON CONFLICT(validation_id, agent_kind) DO UPDATE SET
                 input_context = excluded.input_context,
                 status = 'processing',
                 updated_at = excluded.updated_at
             WHERE agent_analyses.status = 'failed'",
            params![
                validation_id.to_string(),
                agent.as_str(),
                serde_json::to_string(input_context)?,
                now,
            ],
        )?;

        Ok(changed > 0)
    }

    /// Record a successful agent outcome.
    pub fn complete_agent(
        &self,
        validation_id: Uuid,
        agent: AgentKind,
        outcome: &AgentOutcome,
    ) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE agent_analyses
             SET analysis = ?3, score = ?4, reasoning = ?5, status = 'completed', updated_at = ?6
             WHERE validation_id = ?1 AND agent_kind = ?2",
            params![
                validation_id.to_string(),
                agent.as_str(),
                serde_json::to_string(&outcome.analysis)?,
                outcome.score,
                outcome.reasoning,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(VentureError::NotFound(format!(
                "agent analysis ({validation_id}, {agent})"
            )));
        }
        Ok(())
    }

    /// Mark an agent attempt failed so the next poll can reclaim it.
    pub fn fail_agent(&self, validation_id: Uuid, agent: AgentKind) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE agent_analyses
             SET status = 'failed', updated_at = ?3
             WHERE validation_id = ?1 AND agent_kind = ?2 AND status = 'processing'",
            params![
                validation_id.to_string(),
                agent.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All analyses for a validation, in the fixed agent order. Rows whose
    /// stored kind no longer parses are skipped (schema drift is ignored).
    pub fn list_analyses(&self, validation_id: Uuid) -> Result<Vec<AgentAnalysis>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT agent_kind, input_context, analysis, score, reasoning, status,
                    created_at, updated_at
             FROM agent_analyses WHERE validation_id = ?1",
        )?;

        let rows = stmt.query_map(params![validation_id.to_string()], |row| {
            let kind: String = row.get(0)?;
            let input_context: String = row.get(1)?;
            let analysis: Option<String> = row.get(2)?;
            let score: Option<f64> = row.get(3)?;
            let reasoning: Option<String> = row.get(4)?;
            let status: String = row.get(5)?;
            let created_at: String = row.get(6)?;
            let updated_at: String = row.get(7)?;
            Ok((
                kind,
                input_context,
                analysis,
                score,
                reasoning,
                status,
                created_at,
                updated_at,
            ))
        })?;

        let mut analyses = Vec::new();
        for row in rows {
            let (kind, input_context, analysis, score, reasoning, status, created_at, updated_at) =
                row?;

            // Unknown kinds or statuses are dropped rather than failing the
            // whole listing.
            let Some(agent) = AgentKind::parse(&kind) else {
                tracing::warn!("skipping analysis row with unknown agent kind '{}'", kind);
                continue;
            };
            let Some(status) = AnalysisStatus::parse(&status) else {
                tracing::warn!("skipping analysis row with unknown status '{}'", status);
                continue;
            };

            analyses.push(AgentAnalysis {
                validation_id,
                agent,
                input_context: serde_json::from_str(&input_context)
                    .unwrap_or(Value::Object(Default::default())),
                analysis: analysis.and_then(|a| serde_json::from_str(&a).ok()),
                score,
                reasoning,
                status,
                created_at: parse_timestamp(&created_at),
                updated_at: parse_timestamp(&updated_at),
            });
        }

        analyses.sort_by_key(|a| a.agent);
        Ok(analyses)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Persist (or replace) the normalized report for a validation.
    pub fn store_report(&self, validation_id: Uuid, report: &Value, overall_score: f64) -> Result<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO reports (validation_id, report_data, overall_score, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(validation_id) DO UPDATE SET
                 report_data = excluded.report_data,
                 overall_score = excluded.overall_score,
                 updated_at = excluded.updated_at",
            params![
                validation_id.to_string(),
                serde_json::to_string(report)?,
                overall_score,
                now,
            ],
        )?;
        Ok(())
    }

    /// Fetch the stored report document and its overall score.
    pub fn get_report(&self, validation_id: Uuid) -> Result<Option<(Value, f64)>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT report_data, overall_score FROM reports WHERE validation_id = ?1",
                params![validation_id.to_string()],
                |row| {
                    let data: String = row.get(0)?;
                    let score: f64 = row.get(1)?;
                    Ok((data, score))
                },
            )
            .optional()?;

        match row {
            Some((data, score)) => Ok(Some((serde_json::from_str(&data)?, score))),
            None => Ok(None),
        }
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_form() -> NewValidation {
        NewValidation {
            idea: "A marketplace for dog walkers".to_string(),
            business_type: Some("marketplace".to_string()),
            stage: None,
            target_audience: Some("urban pet owners".to_string()),
            competitors: None,
            growth_metrics: None,
            team_members: vec![TeamMember {
                name: "Dana".to_string(),
                skills: vec!["ops".to_string(), "sales".to_string()],
            }],
        }
    }

    #[test]
    fn test_validation_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let created = db.insert_validation(&sample_form()).unwrap();

        let fetched = db.get_validation(created.id).unwrap().unwrap();
        assert_eq!(fetched.idea, "A marketplace for dog walkers");
        assert_eq!(fetched.status, ValidationStatus::Pending);
        assert_eq!(fetched.team_members.len(), 1);
        assert_eq!(fetched.team_members[0].skills, vec!["ops", "sales"]);
    }

    #[test]
    fn test_missing_validation_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_validation(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_fractional_score_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let validation = db.insert_validation(&sample_form()).unwrap();

        assert!(db
            .claim_agent(validation.id, AgentKind::Problem, &json!({}))
            .unwrap());
        db.complete_agent(
            validation.id,
            AgentKind::Problem,
            &AgentOutcome {
                score: 7.5,
                reasoning: "clear pain point".to_string(),
                analysis: json!({"score": 7.5}),
            },
        )
        .unwrap();

        let analyses = db.list_analyses(validation.id).unwrap();
        assert_eq!(analyses.len(), 1);
        // Exactly 7.5, not truncated to an integer
        assert_eq!(analyses[0].score, Some(7.5));
    }

    #[test]
    fn test_claim_is_idempotent_while_processing() {
        let db = Database::open_in_memory().unwrap();
        let validation = db.insert_validation(&sample_form()).unwrap();

        assert!(db
            .claim_agent(validation.id, AgentKind::Market, &json!({}))
            .unwrap());
        // Second claim loses the race
        assert!(!db
            .claim_agent(validation.id, AgentKind::Market, &json!({}))
            .unwrap());
    }

    #[test]
    fn test_failed_agent_can_be_reclaimed() {
        let db = Database::open_in_memory().unwrap();
        let validation = db.insert_validation(&sample_form()).unwrap();

        assert!(db
            .claim_agent(validation.id, AgentKind::Legal, &json!({}))
            .unwrap());
        db.fail_agent(validation.id, AgentKind::Legal).unwrap();

        assert!(db
            .claim_agent(validation.id, AgentKind::Legal, &json!({"retry": true}))
            .unwrap());
        let analyses = db.list_analyses(validation.id).unwrap();
        assert_eq!(analyses[0].status, AnalysisStatus::Processing);
        assert_eq!(analyses[0].input_context, json!({"retry": true}));
    }

    #[test]
    fn test_completed_agent_not_reclaimed() {
        let db = Database::open_in_memory().unwrap();
        let validation = db.insert_validation(&sample_form()).unwrap();

        db.claim_agent(validation.id, AgentKind::Team, &json!({}))
            .unwrap();
        db.complete_agent(
            validation.id,
            AgentKind::Team,
            &AgentOutcome {
                score: 6.0,
                reasoning: String::new(),
                analysis: json!({}),
            },
        )
        .unwrap();

        assert!(!db
            .claim_agent(validation.id, AgentKind::Team, &json!({}))
            .unwrap());
    }

    #[test]
    fn test_unknown_agent_kind_rows_skipped() {
        let db = Database::open_in_memory().unwrap();
        let validation = db.insert_validation(&sample_form()).unwrap();

        db.claim_agent(validation.id, AgentKind::Problem, &json!({}))
            .unwrap();
        db.complete_agent(
            validation.id,
            AgentKind::Problem,
            &AgentOutcome {
                score: 7.0,
                reasoning: "clear".to_string(),
                analysis: json!({"score": 7.0}),
            },
        )
        .unwrap();

        // Row written by a newer deployment with an agent this build does
        // not know about
        {
            let conn = db.conn().unwrap();
            conn.execute(
                "INSERT INTO agent_analyses
                     (validation_id, agent_kind, status, created_at, updated_at)
                 VALUES (?1, 'astrology', 'completed', ?2, ?2)",
                params![validation.id.to_string(), Utc::now().to_rfc3339()],
            )
            .unwrap();
        }

        let analyses = db.list_analyses(validation.id).unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].agent, AgentKind::Problem);

        // The foreign row does not perturb sequencing either
        use crate::agents::sequencer::{ValidationPhase, phase};
        assert_eq!(
            phase(&analyses),
            ValidationPhase::AgentPending(AgentKind::Market)
        );
    }

    #[test]
    fn test_report_round_trip_and_replace() {
        let db = Database::open_in_memory().unwrap();
        let validation = db.insert_validation(&sample_form()).unwrap();

        let report = json!({"moat_status": "Strong"});
        db.store_report(validation.id, &report, 7.2).unwrap();
        let (stored, score) = db.get_report(validation.id).unwrap().unwrap();
        assert_eq!(stored, report);
        assert_eq!(score, 7.2);

        db.store_report(validation.id, &json!({"moat_status": "Weak"}), 3.0)
            .unwrap();
        let (stored, score) = db.get_report(validation.id).unwrap().unwrap();
        assert_eq!(stored["moat_status"], "Weak");
        assert_eq!(score, 3.0);
    }

    #[test]
    fn test_status_transitions() {
        let db = Database::open_in_memory().unwrap();
        let validation = db.insert_validation(&sample_form()).unwrap();

        db.set_validation_status(validation.id, ValidationStatus::Completed)
            .unwrap();
        let fetched = db.get_validation(validation.id).unwrap().unwrap();
        assert_eq!(fetched.status, ValidationStatus::Completed);

        assert!(db
            .set_validation_status(Uuid::new_v4(), ValidationStatus::Completed)
            .is_err());
    }
}
