//! Plan enrichment. Attaches guidance text to the skeleton via the text generator.
//!
//! Bounded state machine: Generate → Validate → Repair (once) → Validate → Fallback.
//! At most two generator calls per request. The merged template always keeps the
//! skeleton's structure.

use crate::domain::template::{ValidatedTemplate, merge_with_skeleton, parse_and_validate};
use crate::domain::{ActivityStats, ActivitySummary, DomainError, Level, TemplateSession};
use crate::ports::{CompletionRequest, TextGenerationPort};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 900;

const GENERATION_SYSTEM: &str = "You are a training plan generator. \
Answer ONLY with a valid JSON object (RFC 8259). No prose, no Markdown. \
You receive a skeleton of sessions (dayOfWeek/type/durationMinutes/targetDistanceKm). \
Keep it strictly: do not reorder it, do not change dayOfWeek, type, durationMinutes or targetDistanceKm. \
Only fill in: intensity, sessionGoal, details{warmup,main,cooldown}, tips. \
Strict format: { \"level\": \"beginner|intermediate|advanced|unknown\", \"sessions\": [ ... ] }. \
The level field must equal detectedLevel. \
Keep text short: warmup<=60c, main<=90c, cooldown<=60c, sessionGoal<=60c, intensity<=50c, tips max 2 (<=50c). \
One line per text field. Avoid double quotes inside texts.";

const REPAIR_SYSTEM: &str = "You are a JSON corrector. \
Answer ONLY with a valid JSON object matching the requested schema. No prose.";

const EXPECTED_SCHEMA: &str = "{ level, sessions[{dayOfWeek,type,durationMinutes,targetDistanceKm,\
intensity,sessionGoal,details{warmup,main,cooldown},tips}] }";

/// Request context forwarded to the generator alongside the skeleton.
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentContext<'a> {
    pub user_id: u64,
    /// Working objective (possibly substituted by the realism check).
    pub objective: &'a str,
    pub original_objective: &'a str,
    pub start_date: &'a str,
    pub time_zone: &'a str,
    pub preferred_start_time: &'a str,
    pub sessions_per_week: u8,
    pub availability: &'a [String],
    pub level: Level,
    pub stats: &'a ActivityStats,
    pub summary: &'a ActivitySummary,
}

/// Result of enrichment. Neither variant is an error: a fallback still yields a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    /// Safe template, one entry per skeleton slot.
    Enriched {
        template: Vec<TemplateSession>,
        repaired: bool,
    },
    /// Both attempts failed; `reason` is the last validation or upstream failure.
    Fallback { reason: String },
}

/// Tagged result of one generate-and-validate attempt.
enum Attempt {
    Valid(ValidatedTemplate),
    Invalid { reason: String, output: String },
}

pub struct PlanEnricher {
    generator: Arc<dyn TextGenerationPort>,
}

impl PlanEnricher {
    pub fn new(generator: Arc<dyn TextGenerationPort>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_configured()
    }

    /// Run the bounded generate/repair machine.
    ///
    /// # Errors
    /// Only `DomainError::MissingCredentials`. Every other generator failure counts
    /// as a failed attempt.
    pub async fn enrich(
        &self,
        skeleton: &[TemplateSession],
        ctx: &EnrichmentContext<'_>,
    ) -> Result<EnrichmentOutcome, DomainError> {
        let (reason, output) = match self.attempt(&generation_request(skeleton, ctx)).await? {
            Attempt::Valid(template) => {
                info!(sessions = template.len(), "generated template accepted");
                return Ok(EnrichmentOutcome::Enriched {
                    template: merge_with_skeleton(skeleton, &template),
                    repaired: false,
                });
            }
            Attempt::Invalid { reason, output } => (reason, output),
        };

        warn!(
            reason = %reason,
            output = %preview(&output),
            "generated template rejected, requesting repair"
        );

        let repair = repair_request(skeleton, ctx, &reason, &output);
        match self.attempt(&repair).await? {
            Attempt::Valid(template) => {
                info!(sessions = template.len(), "repaired template accepted");
                Ok(EnrichmentOutcome::Enriched {
                    template: merge_with_skeleton(skeleton, &template),
                    repaired: true,
                })
            }
            Attempt::Invalid { reason, output } => {
                warn!(
                    reason = %reason,
                    output = %preview(&output),
                    "repair rejected, falling back to empty plan"
                );
                Ok(EnrichmentOutcome::Fallback { reason })
            }
        }
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<Attempt, DomainError> {
        match self.generator.complete(request).await {
            Ok(raw) => Ok(match parse_and_validate(&raw) {
                Ok(template) => Attempt::Valid(template),
                Err(rejection) => Attempt::Invalid {
                    reason: rejection.to_string(),
                    output: raw,
                },
            }),
            Err(DomainError::MissingCredentials) => Err(DomainError::MissingCredentials),
            Err(e) => Ok(Attempt::Invalid {
                reason: e.to_string(),
                output: String::new(),
            }),
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}

fn generation_request(skeleton: &[TemplateSession], ctx: &EnrichmentContext<'_>) -> CompletionRequest {
    let payload = json!({
        "userId": ctx.user_id,
        "objective": ctx.objective,
        "objectiveOriginal": ctx.original_objective,
        "startDate": ctx.start_date,
        "timeZone": ctx.time_zone,
        "preferredStartTime": ctx.preferred_start_time,
        "sessionsPerWeek": ctx.sessions_per_week,
        "availabilityDays": ctx.availability,
        "detectedLevel": ctx.level,
        "stats": ctx.stats,
        "skeletonSessions": skeleton,
        "activitySummary": ctx.summary,
    });
    CompletionRequest {
        system: GENERATION_SYSTEM.to_string(),
        user: payload.to_string(),
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
        json_mode: true,
    }
}

fn repair_request(
    skeleton: &[TemplateSession],
    ctx: &EnrichmentContext<'_>,
    reason: &str,
    invalid_output: &str,
) -> CompletionRequest {
    let payload = json!({
        "error": reason,
        "expectedSchema": EXPECTED_SCHEMA,
        "invalidOutput": invalid_output,
        "sessionsPerWeek": ctx.sessions_per_week,
        "availabilityDays": ctx.availability,
        "detectedLevel": ctx.level,
        "skeletonSessions": skeleton,
    });
    CompletionRequest {
        system: REPAIR_SYSTEM.to_string(),
        user: payload.to_string(),
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
        json_mode: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DayOfWeek, SessionType};
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Generator that replays a fixed script and records every request.
    struct ScriptedGenerator {
        script: Mutex<VecDeque<Result<String, DomainError>>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Result<String, DomainError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<CompletionRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl TextGenerationPort for ScriptedGenerator {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
            self.seen.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DomainError::Ai("script exhausted".to_string())))
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    fn skeleton() -> Vec<TemplateSession> {
        vec![
            TemplateSession::structural(DayOfWeek::Monday, SessionType::Endurance, Some(40), None),
            TemplateSession::structural(DayOfWeek::Wednesday, SessionType::Endurance, Some(40), None),
            TemplateSession::structural(DayOfWeek::Friday, SessionType::Interval, Some(35), None),
        ]
    }

    fn valid_response(days: &[&str]) -> String {
        let sessions: Vec<Value> = days
            .iter()
            .map(|d| {
                json!({
                    "dayOfWeek": d,
                    "type": "long_run",
                    "durationMinutes": 120,
                    "targetDistanceKm": 30,
                    "intensity": "easy",
                    "sessionGoal": "base",
                    "details": { "warmup": "w", "main": "m", "cooldown": "c" },
                    "tips": ["t"]
                })
            })
            .collect();
        json!({ "level": "advanced", "sessions": sessions }).to_string()
    }

    async fn run(generator: Arc<ScriptedGenerator>) -> Result<EnrichmentOutcome, DomainError> {
        let availability = vec!["Lundi".to_string()];
        let stats = ActivityStats {
            sessions_count: 0,
            avg_calories: 0.0,
        };
        let summary = ActivitySummary::default();
        let ctx = EnrichmentContext {
            user_id: 12,
            objective: "course 10km",
            original_objective: "course 10km",
            start_date: "2025-03-03",
            time_zone: "Europe/Paris",
            preferred_start_time: "18:00",
            sessions_per_week: 3,
            availability: &availability,
            level: Level::Beginner,
            stats: &stats,
            summary: &summary,
        };
        PlanEnricher::new(generator).enrich(&skeleton(), &ctx).await
    }

    #[tokio::test]
    async fn test_first_attempt_accepted() {
        let generator = ScriptedGenerator::new(vec![Ok(valid_response(&[
            "Sunday", "Sunday", "Sunday",
        ]))]);
        let outcome = run(generator.clone()).await.unwrap();

        let EnrichmentOutcome::Enriched { template, repaired } = outcome else {
            panic!("expected enriched template");
        };
        assert!(!repaired);
        assert_eq!(generator.calls().len(), 1);
        // Structure comes from the skeleton even though the response claimed otherwise.
        assert_eq!(template, {
            let mut expected = skeleton();
            for s in &mut expected {
                s.intensity = "easy".to_string();
                s.session_goal = "base".to_string();
                s.details.warmup = "w".to_string();
                s.details.main = "m".to_string();
                s.details.cooldown = "c".to_string();
                s.tips = vec!["t".to_string()];
            }
            expected
        });

        let first = &generator.calls()[0];
        assert!(first.json_mode);
        assert_eq!(first.max_tokens, 900);
        let payload: Value = serde_json::from_str(&first.user).unwrap();
        assert_eq!(payload["detectedLevel"], "beginner");
        assert_eq!(payload["skeletonSessions"][2]["type"], "interval");
    }

    #[tokio::test]
    async fn test_repair_after_invalid_output() {
        let generator = ScriptedGenerator::new(vec![
            Ok("Sorry, I cannot do that.".to_string()),
            Ok(valid_response(&["Monday"])),
        ]);
        let outcome = run(generator.clone()).await.unwrap();

        let EnrichmentOutcome::Enriched { template, repaired } = outcome else {
            panic!("expected enriched template");
        };
        assert!(repaired);
        assert_eq!(template.len(), 3);
        assert_eq!(template[2].intensity, "moderate");

        let calls = generator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].system, REPAIR_SYSTEM);
        let repair: Value = serde_json::from_str(&calls[1].user).unwrap();
        assert_eq!(repair["error"], "invalid JSON");
        assert_eq!(repair["invalidOutput"], "Sorry, I cannot do that.");
        assert_eq!(repair["skeletonSessions"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_sessions_twice_falls_back_after_two_calls() {
        let generator = ScriptedGenerator::new(vec![
            Ok(r#"{"level":"beginner"}"#.to_string()),
            Ok(r#"{"level":"beginner"}"#.to_string()),
            Ok(valid_response(&["Monday"])),
        ]);
        let outcome = run(generator.clone()).await.unwrap();

        assert_eq!(
            outcome,
            EnrichmentOutcome::Fallback {
                reason: "sessions missing".to_string()
            }
        );
        assert_eq!(generator.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_upstream_error_counts_as_failed_attempt() {
        let generator = ScriptedGenerator::new(vec![
            Err(DomainError::Ai("API error 503".to_string())),
            Ok(valid_response(&["Monday", "Wednesday", "Friday"])),
        ]);
        let outcome = run(generator.clone()).await.unwrap();
        assert!(matches!(
            outcome,
            EnrichmentOutcome::Enriched { repaired: true, .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_credentials_is_fatal() {
        let generator = ScriptedGenerator::new(vec![Err(DomainError::MissingCredentials)]);
        let result = run(generator.clone()).await;
        assert!(matches!(result, Err(DomainError::MissingCredentials)));
        assert_eq!(generator.calls().len(), 1);
    }
}
