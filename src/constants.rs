//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Scoring constants
pub mod scoring {
    /// Lower bound for agent scores
    pub const MIN_SCORE: f64 = 0.0;

    /// Upper bound for agent scores
    pub const MAX_SCORE: f64 = 10.0;

    /// Overall score when no agent produced a numeric score.
    /// Midpoint of the 0-10 scale, keeps the aggregate on the same
    /// scale as individual agent scores.
    pub const NEUTRAL_OVERALL_SCORE: f64 = 5.0;
}

/// Report schema constants
pub mod report {
    /// Valid range for pain severity
    pub const PAIN_SEVERITY_MIN: i64 = 1;
    pub const PAIN_SEVERITY_MAX: i64 = 10;

    /// Default pain severity when absent or non-numeric
    pub const PAIN_SEVERITY_DEFAULT: i64 = 5;

    /// Fallback recommendation summary. The report page always renders a
    /// summary, so this must never be empty.
    pub const DEFAULT_RECOMMENDATION_SUMMARY: &str =
        "Further validation required before an investment recommendation can be made.";
}

/// Idea quality pre-check constants
pub mod precheck {
    /// Minimum idea length (chars) before any structure bonus applies
    pub const MIN_IDEA_LEN: usize = 40;

    /// Idea length (chars) at which the length component saturates
    pub const FULL_IDEA_LEN: usize = 400;

    /// Score below which the client is expected to suggest improving the idea
    pub const IMPROVE_THRESHOLD: f64 = 6.0;
}

/// HTTP/Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Default server bind address
    pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
}
