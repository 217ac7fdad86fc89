//! HTTP user-context adapter. Implements `UserContextPort`.
//!
//! Each lookup has an ordered list of candidate endpoints; the first one that
//! answers 2xx with JSON wins, otherwise the last failure is reported.

use crate::adapters::context::mapper::{activity_from_json, profile_from_json};
use crate::domain::{ActivityEntry, DomainError, ProfileSummary};
use crate::ports::{ActivityRange, UserContextPort};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Profile/activity provider over HTTP.
pub struct HttpContextAdapter {
    client: Client,
    base_url: String,
}

impl HttpContextAdapter {
    /// # Arguments
    /// * `base_url` - Provider root (e.g. "http://127.0.0.1:8000"); a trailing slash is ignored
    ///
    /// Fails if the HTTP client cannot be built (e.g. TLS backend initialization).
    pub fn new(base_url: String) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Context(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn profile_urls(&self, user_id: u64) -> Vec<String> {
        vec![
            format!("{}/user/{}", self.base_url, user_id),
            format!("{}/users/{}", self.base_url, user_id),
            format!("{}/sportsee/user/{}", self.base_url, user_id),
        ]
    }

    fn activity_urls(&self, user_id: u64, range: ActivityRange) -> Vec<String> {
        let query = format!(
            "startWeek={}&endWeek={}",
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d")
        );
        vec![
            format!("{}/user/{}/activity?{}", self.base_url, user_id, query),
            format!("{}/sportsee/user/{}/activity?{}", self.base_url, user_id, query),
        ]
    }

    async fn get_json(&self, url: &str, authorization: Option<&str>) -> Result<Value, DomainError> {
        let mut request = self.client.get(url);
        if let Some(auth) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let res = request
            .send()
            .await
            .map_err(|e| DomainError::Context(format!("Request to {} failed: {}", url, e)))?;

        if !res.status().is_success() {
            return Err(DomainError::Context(format!(
                "{} answered {}",
                url,
                res.status()
            )));
        }

        let json: Value = res
            .json()
            .await
            .map_err(|e| DomainError::Context(format!("{} returned invalid JSON: {}", url, e)))?;
        if json.is_null() {
            return Err(DomainError::Context(format!("{} returned null", url)));
        }
        Ok(json)
    }

    /// Try candidates in order; first success short-circuits.
    async fn first_success(
        &self,
        urls: &[String],
        authorization: Option<&str>,
    ) -> Result<Value, DomainError> {
        let mut last_error = DomainError::Context("no candidate endpoint".to_string());
        for url in urls {
            match self.get_json(url, authorization).await {
                Ok(json) => {
                    debug!(url = %url, "context endpoint answered");
                    return Ok(json);
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "context endpoint failed, trying next");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

#[async_trait::async_trait]
impl UserContextPort for HttpContextAdapter {
    async fn fetch_profile(
        &self,
        user_id: u64,
        authorization: Option<&str>,
    ) -> Result<ProfileSummary, DomainError> {
        let json = self
            .first_success(&self.profile_urls(user_id), authorization)
            .await?;
        let profile = profile_from_json(&json);
        info!(user_id, has_name = profile.first_name.is_some(), "fetched profile");
        Ok(profile)
    }

    async fn fetch_activity(
        &self,
        user_id: u64,
        range: ActivityRange,
        authorization: Option<&str>,
    ) -> Result<Vec<ActivityEntry>, DomainError> {
        let json = self
            .first_success(&self.activity_urls(user_id, range), authorization)
            .await?;
        let entries = activity_from_json(&json);
        info!(user_id, entries = entries.len(), "fetched activity");
        Ok(entries)
    }
}
