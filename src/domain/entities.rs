//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/LLM types here; adapters map into these. JSON field names are
//! camelCase because plans round-trip through the client (calendar export).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of weeks in every generated plan.
pub const PLAN_WEEKS: u32 = 6;

/// Time zone assumed when the request does not name one. Also the only zone
/// the calendar export emits a VTIMEZONE block for.
pub const DEFAULT_TIME_ZONE: &str = "Europe/Paris";

/// Start time assumed when the request does not name one.
pub const DEFAULT_START_TIME: &str = "18:00";

/// Coarse training-goal category derived from the objective text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveBucket {
    Weightloss,
    Running,
    Strength,
    Recovery,
    General,
}

/// Inferred training-experience tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
            Level::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Canonical day of week. Serialized as the English weekday name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Days elapsed since Monday (Monday = 0).
    pub fn offset_from_monday(self) -> i64 {
        match self {
            DayOfWeek::Monday => 0,
            DayOfWeek::Tuesday => 1,
            DayOfWeek::Wednesday => 2,
            DayOfWeek::Thursday => 3,
            DayOfWeek::Friday => 4,
            DayOfWeek::Saturday => 5,
            DayOfWeek::Sunday => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// Normalize free-text availability ("Lundi", "mon", "WEDNESDAY", "ven.") to a
    /// canonical day. Matches on the first three letters, French or English.
    pub fn normalize(input: &str) -> Option<Self> {
        let lower = input.trim().to_lowercase();
        let prefix: String = lower.chars().take(3).collect();
        match prefix.as_str() {
            "lun" | "mon" => Some(DayOfWeek::Monday),
            "mar" | "tue" => Some(DayOfWeek::Tuesday),
            "mer" | "wed" => Some(DayOfWeek::Wednesday),
            "jeu" | "thu" => Some(DayOfWeek::Thursday),
            "ven" | "fri" => Some(DayOfWeek::Friday),
            "sam" | "sat" => Some(DayOfWeek::Saturday),
            "dim" | "sun" => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }

    /// Strict parse of a canonical name (case-insensitive). Used when validating
    /// generated output, where only the names we sent are acceptable.
    pub fn from_canonical(input: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(input.trim()))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    #[default]
    Endurance,
    Interval,
    LongRun,
    Recovery,
    Strength,
}

impl SessionType {
    /// Base duration in minutes before the level multiplier.
    pub fn base_minutes(self) -> f64 {
        match self {
            SessionType::Endurance => 40.0,
            SessionType::Interval => 35.0,
            SessionType::Strength => 40.0,
            SessionType::Recovery => 30.0,
            SessionType::LongRun => 65.0,
        }
    }

    /// Human label used in session titles.
    pub fn label(self) -> &'static str {
        match self {
            SessionType::Endurance => "Endurance",
            SessionType::Interval => "Interval",
            SessionType::LongRun => "Long run",
            SessionType::Recovery => "Recovery",
            SessionType::Strength => "Strength",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionDetails {
    #[serde(default)]
    pub warmup: String,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub cooldown: String,
}

/// One structural slot of the weekly skeleton.
///
/// `day_of_week`, `session_type`, `duration_minutes` and `target_distance_km` are
/// the trusted structural fields: set once by the skeleton builder, never taken
/// from generated text.
///
/// Deserialization only happens for client-supplied plans, so every field is
/// lenient: a value of the wrong shape decodes to the field default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSession {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub day_of_week: DayOfWeek,
    #[serde(rename = "type", default, deserialize_with = "lenient::or_default")]
    pub session_type: SessionType,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub duration_minutes: Option<u32>,
    #[serde(default, deserialize_with = "lenient::kilometres")]
    pub target_distance_km: Option<f64>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub intensity: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub session_goal: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub details: SessionDetails,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub tips: Vec<String>,
}

impl TemplateSession {
    /// A slot with structure only; text fields are filled by enrichment.
    pub fn structural(
        day_of_week: DayOfWeek,
        session_type: SessionType,
        duration_minutes: Option<u32>,
        target_distance_km: Option<f64>,
    ) -> Self {
        Self {
            day_of_week,
            session_type,
            duration_minutes,
            target_distance_km,
            intensity: String::new(),
            session_goal: String::new(),
            details: SessionDetails::default(),
            tips: Vec::new(),
        }
    }
}

/// A dated session in the assembled plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// `W{week}-S{index}`. May be empty in client-supplied plans.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub title: String,
    /// `YYYY-MM-DD`. Kept as text so exported plans with bad dates are skipped, not rejected.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub date: String,
    #[serde(default = "default_start_time", deserialize_with = "lenient::or_default")]
    pub start_time: String,
    #[serde(flatten)]
    pub slot: TemplateSession,
}

fn default_start_time() -> String {
    DEFAULT_START_TIME.to_string()
}

/// Field decoders for client-supplied plans.
mod lenient {
    use serde::{Deserialize, Deserializer, de::DeserializeOwned};
    use serde_json::Value;

    /// The typed value, or `T::default()` when the JSON has another shape.
    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    /// Any non-negative number, rounded to whole minutes.
    pub fn minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_f64()
            .filter(|m| m.is_finite() && *m >= 0.0)
            .map(|m| m.round().min(f64::from(u32::MAX)) as u32))
    }

    pub fn kilometres<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_f64().filter(|km| km.is_finite()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub week_number: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningType {
    UnrealisticGoal,
    MissingData,
    InvalidPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_objective: Option<String>,
}

impl Warning {
    pub fn new(kind: WarningType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggested_objective: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default)]
    pub sessions_per_week: u8,
    #[serde(default = "default_level")]
    pub level: Level,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_level() -> Level {
    Level::Unknown
}

/// Six-week schedule. Built per request, never mutated after being returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub meta: PlanMeta,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    pub weeks: Vec<Week>,
}

// ─────────────────────────────────────────────────────────────────────────────
// User context
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTotals {
    #[serde(default)]
    pub total_distance_km: Option<f64>,
    #[serde(default)]
    pub total_sessions: Option<u32>,
    #[serde(default)]
    pub total_duration_minutes: Option<f64>,
}

/// One historical session. Either reading may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub kilogram: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
}

/// Profile fragment plus the most recent sessions (at most [`ActivitySummary::HISTORY_LEN`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    #[serde(default)]
    pub profile: ProfileSummary,
    #[serde(default)]
    pub totals: Option<ActivityTotals>,
    #[serde(default)]
    pub last10: Vec<ActivityEntry>,
}

impl ActivitySummary {
    pub const HISTORY_LEN: usize = 10;

    /// True when nothing usable came back from the context providers.
    pub fn is_empty(&self) -> bool {
        let has_profile = self
            .profile
            .first_name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        let has_history = !self.last10.is_empty();
        let has_totals = self
            .totals
            .as_ref()
            .and_then(|t| t.total_distance_km)
            .is_some_and(f64::is_finite);
        !has_profile && !has_history && !has_totals
    }

    /// Keep only the most recent entries.
    pub fn truncate_history(mut self) -> Self {
        let len = self.last10.len();
        if len > Self::HISTORY_LEN {
            self.last10.drain(..len - Self::HISTORY_LEN);
        }
        self
    }
}

/// Aggregates the level detector works from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub sessions_count: usize,
    pub avg_calories: f64,
}

/// Validated plan request, as handed to the planning use case.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    pub objective: String,
    pub start_date: String,
    pub time_zone: Option<String>,
    pub preferred_start_time: Option<String>,
    pub availability_days: Vec<String>,
    pub sessions_per_week: Option<u8>,
    pub user_id: Option<u64>,
    pub activity_summary: Option<ActivitySummary>,
    /// Authorization header value forwarded to the user-context provider.
    pub authorization: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_session_with_odd_fields_still_decodes() {
        let session: Session = serde_json::from_value(json!({
            "id": "W1-S1",
            "date": "2025-03-03",
            "dayOfWeek": "Lundi",
            "type": "yoga",
            "durationMinutes": 45.6,
            "targetDistanceKm": "far",
            "intensity": 7,
            "tips": ["stretch", 3]
        }))
        .unwrap();
        assert_eq!(session.date, "2025-03-03");
        assert_eq!(session.start_time, DEFAULT_START_TIME);
        assert_eq!(session.slot.day_of_week, DayOfWeek::Monday);
        assert_eq!(session.slot.session_type, SessionType::Endurance);
        assert_eq!(session.slot.duration_minutes, Some(46));
        assert_eq!(session.slot.target_distance_km, None);
        assert_eq!(session.slot.intensity, "");
        assert!(session.slot.tips.is_empty());
    }

    #[test]
    fn test_normalize_days_french_and_english() {
        assert_eq!(DayOfWeek::normalize("Lundi"), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::normalize("mardi"), Some(DayOfWeek::Tuesday));
        assert_eq!(DayOfWeek::normalize(" WEDNESDAY "), Some(DayOfWeek::Wednesday));
        assert_eq!(DayOfWeek::normalize("ven."), Some(DayOfWeek::Friday));
        assert_eq!(DayOfWeek::normalize("Sun"), Some(DayOfWeek::Sunday));
        assert_eq!(DayOfWeek::normalize("someday"), None);
        assert_eq!(DayOfWeek::normalize(""), None);
    }

    #[test]
    fn test_from_canonical_is_strict() {
        assert_eq!(DayOfWeek::from_canonical("friday"), Some(DayOfWeek::Friday));
        assert_eq!(DayOfWeek::from_canonical("Vendredi"), None);
        assert_eq!(DayOfWeek::from_canonical("Fri"), None);
    }

    #[test]
    fn test_session_json_shape() {
        let session = Session {
            id: "W1-S1".to_string(),
            title: "Training — Interval".to_string(),
            date: "2025-03-03".to_string(),
            start_time: "18:00".to_string(),
            slot: TemplateSession::structural(
                DayOfWeek::Monday,
                SessionType::Interval,
                Some(35),
                None,
            ),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["id"], "W1-S1");
        assert_eq!(json["dayOfWeek"], "Monday");
        assert_eq!(json["type"], "interval");
        assert_eq!(json["durationMinutes"], 35);
        assert!(json["targetDistanceKm"].is_null());
        assert_eq!(json["startTime"], "18:00");
    }

    #[test]
    fn test_session_lenient_deserialize() {
        let json = r#"{"dayOfWeek":"Friday","type":"long_run","targetDistanceKm":12.5}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.id.is_empty());
        assert!(session.date.is_empty());
        assert_eq!(session.start_time, DEFAULT_START_TIME);
        assert_eq!(session.slot.session_type, SessionType::LongRun);
        assert_eq!(session.slot.target_distance_km, Some(12.5));
        assert_eq!(session.slot.duration_minutes, None);
    }

    #[test]
    fn test_warning_serializes_type_tag() {
        let w = Warning::new(WarningType::InvalidPlan, "bad");
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["type"], "InvalidPlan");
        assert!(json.get("suggestedObjective").is_none());
    }

    #[test]
    fn test_summary_emptiness_and_truncation() {
        assert!(ActivitySummary::default().is_empty());

        let summary = ActivitySummary {
            last10: (0..14)
                .map(|i| ActivityEntry {
                    day: Some(format!("2025-01-{:02}", i + 1)),
                    kilogram: None,
                    calories: Some(200.0),
                })
                .collect(),
            ..Default::default()
        }
        .truncate_history();
        assert!(!summary.is_empty());
        assert_eq!(summary.last10.len(), 10);
        assert_eq!(summary.last10[0].day.as_deref(), Some("2025-01-05"));
    }
}
