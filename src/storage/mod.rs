//! Persistence Layer
//!
//! SQLite storage for validations, team members, agent analyses, and the
//! final reports, behind an r2d2 connection pool.

pub mod database;

pub use database::{Database, PoolConfig, SharedDatabase};
