//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the HTTP adapter into the application
//! - Outbound: Called by the application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::PlanningPort;
pub use outbound::{ActivityRange, CompletionRequest, TextGenerationPort, UserContextPort};
