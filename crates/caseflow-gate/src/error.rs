//! Caller-visible gate outcomes.

use axum::http::StatusCode;
use caseflow_authz::{ReasonCode, ResourceName};
use thiserror::Error;

/// Result type for gate checks.
pub type GateResult<T> = Result<T, GateError>;

/// Why the gate refused a request.
#[derive(Debug, Error)]
pub enum GateError {
    // 401 Unauthorized
    #[error("Authentication required")]
    Unauthenticated,

    // 403 Forbidden
    #[error("Access denied ({code})")]
    Forbidden { code: ReasonCode },

    // 404 Not Found
    #[error("{}", not_found_message(resource, id.as_deref()))]
    ResourceNotFound {
        resource: ResourceName,
        id: Option<String>,
    },

    // 500 Internal Server Error
    #[error("Authorization misconfigured ({code})")]
    Misconfigured { code: ReasonCode },

    #[error("Internal authorization error: {0}")]
    Internal(String),
}

fn not_found_message(resource: &ResourceName, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{resource} `{id}` not found"),
        None => format!("{resource} not found: no id given"),
    }
}

impl GateError {
    /// Map an engine denial code to a gate outcome. Only a broken ownership
    /// declaration is a server fault; an actor with an undeclared role is
    /// simply refused.
    pub fn from_denial(code: ReasonCode) -> Self {
        if code == ReasonCode::MisconfiguredOwnership {
            Self::Misconfigured { code }
        } else {
            Self::Forbidden { code }
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Misconfigured { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code for logs and clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden { code } | Self::Misconfigured { code } => code.as_str(),
            Self::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ENGINE_ERROR",
        }
    }

    /// Engine reason code, when the engine produced one.
    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Forbidden { code } | Self::Misconfigured { code } => Some(*code),
            _ => None,
        }
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}
