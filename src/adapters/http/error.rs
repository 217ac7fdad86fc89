//! Map `PlanError` to HTTP responses.

use crate::domain::PlanError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

pub fn status_for(err: &PlanError) -> StatusCode {
    match err {
        PlanError::InvalidInput(_) | PlanError::OutOfScopeObjective => StatusCode::BAD_REQUEST,
        PlanError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        PlanError::UpstreamConfigMissing | PlanError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::info!(code = self.code(), error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
