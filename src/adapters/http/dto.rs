//! Request bodies. Field names are camelCase on the wire.

use crate::domain::{ActivitySummary, PlanRequest, TrainingPlan};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequestBody {
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default, alias = "preferredTime")]
    pub preferred_start_time: Option<String>,
    #[serde(default)]
    pub availability_days: Vec<String>,
    #[serde(default)]
    pub sessions_per_week: Option<u32>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub activity_summary: Option<ActivitySummary>,
}

impl PlanRequestBody {
    /// Domain request. `authorization` is the raw header value, forwarded as-is.
    pub fn into_request(self, authorization: Option<String>) -> PlanRequest {
        PlanRequest {
            objective: self.objective.unwrap_or_default(),
            start_date: self.start_date.unwrap_or_default(),
            time_zone: self.time_zone,
            preferred_start_time: self.preferred_start_time,
            availability_days: self.availability_days,
            sessions_per_week: self
                .sessions_per_week
                .map(|n| u8::try_from(n).unwrap_or(u8::MAX)),
            user_id: self.user_id,
            activity_summary: self.activity_summary,
            authorization,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CalendarExportBody {
    #[serde(default)]
    pub plan: Option<TrainingPlan>,
}
