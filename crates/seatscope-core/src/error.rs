//! Error types for the association engine.

use thiserror::Error;

/// Errors produced by snapshot validation and association derivation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A snapshot failed referential-integrity validation at construction.
    /// Fatal to the run; the engine never retries.
    #[error("malformed snapshot for org '{org}': {reason}")]
    MalformedSnapshot { org: String, reason: String },

    /// A derived association violated an internal invariant (for example a
    /// user associated with themselves). Signals a defect rather than bad
    /// input, so the run aborts instead of writing a wrong report.
    #[error("association invariant violated: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    pub(crate) fn malformed(org: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            org: org.to_string(),
            reason: reason.into(),
        }
    }
}
