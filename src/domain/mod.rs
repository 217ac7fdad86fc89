//! Core domain layer. No external I/O dependencies.
//!
//! Entities and planning rules live here. Dependencies flow inward.

pub mod assembler;
pub mod calendar;
pub mod entities;
pub mod errors;
pub mod level;
pub mod objective;
pub mod skeleton;
pub mod template;

pub use entities::{
    ActivityEntry, ActivityStats, ActivitySummary, ActivityTotals, DayOfWeek, Level,
    ObjectiveBucket, PlanMeta, PlanRequest, ProfileSummary, Session, SessionDetails, SessionType,
    TemplateSession, TrainingPlan, Warning, WarningType, Week,
};
pub use errors::{DomainError, PlanError};
