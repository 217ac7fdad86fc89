//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into `DomainError`; the planning use case
//! surfaces `PlanError` to callers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Generative-text service failed (transport, non-success status, unusable body).
    #[error("AI generation failed: {0}")]
    Ai(String),

    /// Generative-text credential is not configured. Fatal, never retried.
    #[error("AI API key not configured")]
    MissingCredentials,

    #[error("User context unavailable: {0}")]
    Context(String),
}

/// Failures surfaced by a plan request. Everything else degrades to warnings.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(
        "Objective out of scope: the planner only handles sport training \
         (running, strength, endurance, recovery, ...)"
    )]
    OutOfScopeObjective,

    #[error("Generative-text service credential missing on the server")]
    UpstreamConfigMissing,

    #[error("Plan generation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlanError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::InvalidInput(_) => "INVALID_INPUT",
            PlanError::OutOfScopeObjective => "OBJECTIVE_OUT_OF_SCOPE",
            PlanError::UpstreamConfigMissing => "UPSTREAM_CONFIG_MISSING",
            PlanError::Timeout(_) => "TIMEOUT",
            PlanError::Internal(_) => "INTERNAL",
        }
    }
}
