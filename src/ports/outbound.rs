//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ActivityEntry, DomainError, ProfileSummary};
use chrono::NaiveDate;

/// One chat-completion style request: a system instruction plus a user payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the service for a bare JSON object.
    pub json_mode: bool,
}

/// Generative-text service. Output is untrusted text.
#[async_trait::async_trait]
pub trait TextGenerationPort: Send + Sync {
    /// Return the raw text of the first completion choice.
    ///
    /// `DomainError::MissingCredentials` is fatal; every other error is treated
    /// by the caller as a failed attempt.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError>;

    /// False when the credential is absent. Checked before any network call.
    fn is_configured(&self) -> bool;
}

/// Date range for activity lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Read-only user context (profile, recent activity). Best effort: the caller
/// turns any error into a `MissingData` warning.
#[async_trait::async_trait]
pub trait UserContextPort: Send + Sync {
    async fn fetch_profile(
        &self,
        user_id: u64,
        authorization: Option<&str>,
    ) -> Result<ProfileSummary, DomainError>;

    /// Activity entries in chronological order. May be longer than ten.
    async fn fetch_activity(
        &self,
        user_id: u64,
        range: ActivityRange,
        authorization: Option<&str>,
    ) -> Result<Vec<ActivityEntry>, DomainError>;
}
