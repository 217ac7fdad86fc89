//! Planning service. Implements `PlanningPort`.
//!
//! Orchestrates the flow:
//! 1. Validate the request (objective, sport gate, date, time, credential)
//! 2. Classify the objective, fetch user context, detect the level
//! 3. Build the skeleton and enrich it
//! 4. Assemble six dated weeks (or the fallback plan)
//!
//! Steps 2-4 run under one timeout. Context and generator failures degrade to
//! warnings; only the `PlanError` taxonomy is surfaced.

use crate::domain::assembler::{self, AssemblyInput};
use crate::domain::calendar;
use crate::domain::entities::{DEFAULT_START_TIME, DEFAULT_TIME_ZONE};
use crate::domain::level::{compute_stats, level_from_stats};
use crate::domain::objective::{classify, is_sport_objective};
use crate::domain::skeleton::{build_skeleton, sessions_per_week};
use crate::domain::{
    ActivitySummary, DomainError, PlanError, PlanRequest, TrainingPlan, Warning, WarningType,
};
use crate::ports::{ActivityRange, PlanningPort, TextGenerationPort, UserContextPort};
use crate::usecases::plan_enricher::{EnrichmentContext, EnrichmentOutcome, PlanEnricher};
use chrono::{Duration as DateDuration, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Activity history requested before the start date.
const CONTEXT_WINDOW_DAYS: i64 = 28;

const MISSING_DATA_MESSAGE: &str =
    "User activity data unavailable: plan generated conservatively.";

/// A request that passed validation. Owned so it can move into the timed future.
#[derive(Debug, Clone)]
struct ValidatedRequest {
    objective: String,
    start_date: NaiveDate,
    time_zone: String,
    preferred_start_time: String,
    availability: Vec<String>,
    sessions_per_week: Option<u8>,
    user_id: u64,
    activity_summary: Option<ActivitySummary>,
    authorization: Option<String>,
}

pub struct PlanService {
    enricher: PlanEnricher,
    context: Arc<dyn UserContextPort>,
    default_user_id: u64,
    timeout: Duration,
}

impl PlanService {
    /// Create a new planning service.
    ///
    /// # Arguments
    /// * `generator` - Text generation port (OpenAI-compatible client, mock, ...)
    /// * `context` - User-context provider
    /// * `default_user_id` - Used when the request names no user
    /// * `timeout` - Deadline for everything after validation
    pub fn new(
        generator: Arc<dyn TextGenerationPort>,
        context: Arc<dyn UserContextPort>,
        default_user_id: u64,
        timeout: Duration,
    ) -> Self {
        Self {
            enricher: PlanEnricher::new(generator),
            context,
            default_user_id,
            timeout,
        }
    }

    fn validate(&self, request: PlanRequest) -> Result<ValidatedRequest, PlanError> {
        let objective = request.objective.trim().to_string();
        if objective.is_empty() {
            return Err(PlanError::InvalidInput("objective is required".to_string()));
        }
        if !is_sport_objective(&objective) {
            return Err(PlanError::OutOfScopeObjective);
        }

        let start_date = parse_start_date(&request.start_date).ok_or_else(|| {
            PlanError::InvalidInput("startDate must be a valid YYYY-MM-DD date".to_string())
        })?;

        let preferred_start_time = match request.preferred_start_time.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_START_TIME.to_string(),
            Some(t) if is_valid_time(t) => t.to_string(),
            Some(_) => {
                return Err(PlanError::InvalidInput(
                    "preferredStartTime must be HH:MM".to_string(),
                ));
            }
        };

        if !self.enricher.is_configured() {
            return Err(PlanError::UpstreamConfigMissing);
        }

        let time_zone = request
            .time_zone
            .map(|tz| tz.trim().to_string())
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());

        Ok(ValidatedRequest {
            objective,
            start_date,
            time_zone,
            preferred_start_time,
            availability: request.availability_days,
            sessions_per_week: request.sessions_per_week,
            user_id: request
                .user_id
                .filter(|id| *id > 0)
                .unwrap_or(self.default_user_id),
            activity_summary: request.activity_summary,
            authorization: request.authorization,
        })
    }

    /// Profile and activity, fetched concurrently. Failures are logged and ignored.
    async fn fetch_context(
        &self,
        user_id: u64,
        start_date: NaiveDate,
        authorization: Option<&str>,
    ) -> ActivitySummary {
        let range = ActivityRange {
            start: start_date - DateDuration::days(CONTEXT_WINDOW_DAYS),
            end: start_date - DateDuration::days(1),
        };

        let (profile, activity) = tokio::join!(
            self.context.fetch_profile(user_id, authorization),
            self.context.fetch_activity(user_id, range, authorization),
        );

        let profile = profile.unwrap_or_else(|e| {
            warn!(user_id, error = %e, "profile unavailable");
            Default::default()
        });
        let last10 = activity.unwrap_or_else(|e| {
            warn!(user_id, error = %e, "activity unavailable");
            Vec::new()
        });

        ActivitySummary {
            profile,
            totals: None,
            last10,
        }
    }

    async fn run(&self, req: ValidatedRequest) -> Result<TrainingPlan, PlanError> {
        let mut warnings: Vec<Warning> = Vec::new();

        let assessment = classify(&req.objective);
        if let Some(w) = assessment.warning.clone() {
            warnings.push(w);
        }

        let summary = match req.activity_summary {
            Some(summary) => summary,
            None => {
                self.fetch_context(req.user_id, req.start_date, req.authorization.as_deref())
                    .await
            }
        }
        .truncate_history();
        if summary.is_empty() {
            warnings.push(Warning::new(WarningType::MissingData, MISSING_DATA_MESSAGE));
        }

        let stats = compute_stats(&summary);
        let level = level_from_stats(&stats);
        let per_week = sessions_per_week(req.sessions_per_week, req.availability.len());
        let skeleton = build_skeleton(assessment.bucket, level, &req.availability, per_week);

        info!(
            bucket = ?assessment.bucket,
            level = %level,
            sessions_per_week = per_week,
            history = summary.last10.len(),
            "skeleton built"
        );

        let start_date = assembler::format_date(req.start_date);
        let ctx = EnrichmentContext {
            user_id: req.user_id,
            objective: &assessment.working_objective,
            original_objective: &req.objective,
            start_date: &start_date,
            time_zone: &req.time_zone,
            preferred_start_time: &req.preferred_start_time,
            sessions_per_week: per_week,
            availability: &req.availability,
            level,
            stats: &stats,
            summary: &summary,
        };
        let outcome = self.enricher.enrich(&skeleton, &ctx).await.map_err(|e| match e {
            DomainError::MissingCredentials => PlanError::UpstreamConfigMissing,
            other => PlanError::Internal(other.to_string()),
        })?;

        let input = AssemblyInput {
            objective: req.objective.clone(),
            start_date: req.start_date,
            time_zone: req.time_zone.clone(),
            preferred_start_time: req.preferred_start_time.clone(),
            sessions_per_week: per_week,
            level,
            warnings,
            generated_at: Utc::now(),
        };

        let plan = match outcome {
            EnrichmentOutcome::Enriched { template, repaired } => {
                info!(repaired, "plan enriched");
                assembler::assemble(input, &template)
            }
            EnrichmentOutcome::Fallback { reason } => {
                let mut input = input;
                input.warnings.push(Warning::new(
                    WarningType::InvalidPlan,
                    format!("Invalid template: {}", reason),
                ));
                assembler::fallback(input)
            }
        };
        Ok(plan)
    }
}

/// Strict `YYYY-MM-DD` that is also a real calendar date.
fn parse_start_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let shape_ok = s.len() == 10
        && s.char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `HH:MM`, 00-23 / 00-59, two digits each.
fn is_valid_time(s: &str) -> bool {
    s.len() == 5 && NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}

#[async_trait::async_trait]
impl PlanningPort for PlanService {
    #[instrument(skip_all, fields(objective = %request.objective, start_date = %request.start_date))]
    async fn generate_plan(&self, request: PlanRequest) -> Result<TrainingPlan, PlanError> {
        let validated = self.validate(request)?;

        match tokio::time::timeout(self.timeout, self.run(validated)).await {
            Ok(result) => {
                if let Ok(plan) = &result {
                    info!(
                        weeks = plan.weeks.len(),
                        warnings = plan.warnings.len(),
                        "plan generated"
                    );
                }
                result
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "plan generation timed out");
                Err(PlanError::Timeout(self.timeout.as_secs()))
            }
        }
    }

    fn export_calendar(&self, plan: &TrainingPlan) -> Result<String, PlanError> {
        let ics = calendar::to_ics(plan);
        info!(bytes = ics.len(), "calendar exported");
        Ok(ics)
    }
}
