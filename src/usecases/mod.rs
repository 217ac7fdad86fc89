//! Application use cases. Orchestrate domain logic via ports.

pub mod plan_enricher;
pub mod plan_service;

pub use plan_enricher::{EnrichmentContext, EnrichmentOutcome, PlanEnricher};
pub use plan_service::PlanService;
