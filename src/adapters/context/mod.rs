//! User-context adapter. Implements `UserContextPort` over the profile/activity HTTP API.

pub mod http_client;
pub mod mapper;

pub use http_client::HttpContextAdapter;
