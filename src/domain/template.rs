//! Generated-template handling: permissive parse, structural validation,
//! positional merge onto the skeleton.
//!
//! Generated output is untrusted. Only text overlays survive the merge;
//! day, type, duration and distance always come from the skeleton.

use crate::domain::entities::{DayOfWeek, SessionDetails, TemplateSession};
use serde_json::Value;
use thiserror::Error;

pub const MAX_TIPS: usize = 2;

// Caps applied when merging generated text onto the skeleton.
const INTENSITY_CAP: usize = 50;
const GOAL_CAP: usize = 60;
const WARMUP_CAP: usize = 60;
const MAIN_CAP: usize = 90;
const COOLDOWN_CAP: usize = 60;
const TIP_CAP: usize = 50;

const DEFAULT_INTENSITY: &str = "moderate";
const DEFAULT_GOAL: &str = "general objective";
const DEFAULT_WARMUP: &str = "5 min";
const DEFAULT_MAIN: &str = "session";
const DEFAULT_COOLDOWN: &str = "5 min";

/// Why a generated template was rejected. The message is sent back to the
/// service in the repair request and surfaces in the `InvalidPlan` warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateRejection {
    #[error("invalid JSON")]
    InvalidJson,

    #[error("template is not an object")]
    NotAnObject,

    #[error("sessions missing")]
    MissingSessions,

    #[error("session {0}: invalid dayOfWeek")]
    InvalidDay(usize),

    #[error("session {0}: durationMinutes or targetDistanceKm required")]
    MissingVolume(usize),

    #[error("session {0}: intensity/sessionGoal missing")]
    MissingText(usize),

    #[error("session {0}: incomplete details")]
    IncompleteDetails(usize),
}

/// A response that passed [`validate`]. Holds the raw session objects so only
/// their text fields can be read back.
#[derive(Debug, Clone)]
pub struct ValidatedTemplate {
    sessions: Vec<Value>,
}

impl ValidatedTemplate {
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Truncate to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Extract the outermost JSON object from raw generated text.
///
/// Tolerates markdown fences and prose around the object.
pub fn extract_json_object(raw: &str) -> Result<Value, TemplateRejection> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str(&trimmed[start..=end]).map_err(|_| TemplateRejection::InvalidJson)
        }
        _ => Err(TemplateRejection::InvalidJson),
    }
}

fn non_empty_str(v: Option<&Value>) -> bool {
    v.and_then(Value::as_str).is_some_and(|s| !s.trim().is_empty())
}

fn positive_number(v: Option<&Value>) -> bool {
    v.and_then(Value::as_f64).is_some_and(|n| n > 0.0)
}

fn validate_session(index: usize, s: &Value) -> Result<(), TemplateRejection> {
    let day_ok = s
        .get("dayOfWeek")
        .and_then(Value::as_str)
        .and_then(DayOfWeek::from_canonical)
        .is_some();
    if !day_ok {
        return Err(TemplateRejection::InvalidDay(index));
    }

    if !positive_number(s.get("durationMinutes")) && !positive_number(s.get("targetDistanceKm")) {
        return Err(TemplateRejection::MissingVolume(index));
    }

    if !non_empty_str(s.get("intensity")) || !non_empty_str(s.get("sessionGoal")) {
        return Err(TemplateRejection::MissingText(index));
    }

    let details = s.get("details");
    let details_ok = ["warmup", "main", "cooldown"]
        .iter()
        .all(|k| non_empty_str(details.and_then(|d| d.get(*k))));
    if !details_ok {
        return Err(TemplateRejection::IncompleteDetails(index));
    }

    Ok(())
}

/// Structural validation of a parsed template. First failure wins.
pub fn validate(template: Value) -> Result<ValidatedTemplate, TemplateRejection> {
    let Value::Object(mut obj) = template else {
        return Err(TemplateRejection::NotAnObject);
    };

    let sessions = match obj.remove("sessions") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(TemplateRejection::MissingSessions),
    };

    sessions
        .iter()
        .enumerate()
        .try_for_each(|(i, s)| validate_session(i, s))?;

    Ok(ValidatedTemplate { sessions })
}

/// Parse and validate in one step.
pub fn parse_and_validate(raw: &str) -> Result<ValidatedTemplate, TemplateRejection> {
    extract_json_object(raw).and_then(validate)
}

fn text_or(value: Option<&Value>, default: &str, cap: usize) -> String {
    let text = match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    };
    truncate_chars(&text, cap)
}

fn tips_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .take(MAX_TIPS)
            .map(|t| match t {
                Value::String(s) => truncate_chars(s, TIP_CAP),
                other => truncate_chars(&other.to_string(), TIP_CAP),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Build the safe template: zip the skeleton with the validated response by position.
///
/// Structural fields are copied from the skeleton unconditionally. Text fields
/// come from the response, defaulted and capped; any structural claim the
/// response makes is ignored. Extra generated sessions are dropped.
pub fn merge_with_skeleton(
    skeleton: &[TemplateSession],
    generated: &ValidatedTemplate,
) -> Vec<TemplateSession> {
    skeleton
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let g = generated.sessions.get(i);
            let field = |key: &str| g.and_then(|s| s.get(key));
            let detail = |key: &str| field("details").and_then(|d| d.get(key));

            TemplateSession {
                day_of_week: slot.day_of_week,
                session_type: slot.session_type,
                duration_minutes: slot.duration_minutes,
                target_distance_km: slot.target_distance_km,
                intensity: text_or(field("intensity"), DEFAULT_INTENSITY, INTENSITY_CAP),
                session_goal: text_or(field("sessionGoal"), DEFAULT_GOAL, GOAL_CAP),
                details: SessionDetails {
                    warmup: text_or(detail("warmup"), DEFAULT_WARMUP, WARMUP_CAP),
                    main: text_or(detail("main"), DEFAULT_MAIN, MAIN_CAP),
                    cooldown: text_or(detail("cooldown"), DEFAULT_COOLDOWN, COOLDOWN_CAP),
                },
                tips: tips_from(field("tips")),
            }
        })
        .collect()
}
