//! Infrastructure adapters. Implement outbound ports, drive inbound ones.
//!
//! Text generation, user context, HTTP. Map errors to DomainError / PlanError.

pub mod ai;
pub mod context;
pub mod http;
