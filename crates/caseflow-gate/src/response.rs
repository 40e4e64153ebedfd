//! Error response implementation.

use crate::error::GateError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, code = self.error_code(), "authorization failed internally");
        } else {
            warn!(error = %self, code = self.error_code(), "request refused");
        }

        let status = self.status_code();
        let (message, details) = match &self {
            GateError::ResourceNotFound { resource, id } => (
                self.to_string(),
                Some(serde_json::json!({ "resource": resource, "id": id })),
            ),
            // Declarations and engine internals are not exposed to callers.
            GateError::Misconfigured { .. } | GateError::Internal(_) => {
                ("An internal error occurred".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.error_code(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}
