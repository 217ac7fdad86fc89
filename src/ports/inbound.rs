//! Inbound port. The HTTP adapter calls into the application.

use crate::domain::{PlanError, PlanRequest, TrainingPlan};

/// Input port: plan generation and calendar export.
#[async_trait::async_trait]
pub trait PlanningPort: Send + Sync {
    /// Run the full pipeline for one request. Bounded by the configured timeout.
    async fn generate_plan(&self, request: PlanRequest) -> Result<TrainingPlan, PlanError>;

    /// Serialize a previously generated plan to an iCalendar document.
    fn export_calendar(&self, plan: &TrainingPlan) -> Result<String, PlanError>;
}
