//! HTTP adapter (axum). Drives `PlanningPort`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;

pub use router::{AppState, build_app, serve};
