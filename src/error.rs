//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Non-standard status returned when a websocket upgrade presents a bad `token`.
pub const UPGRADE_REJECTED_STATUS: u16 = 440;

pub fn upgrade_rejected_status() -> StatusCode {
    StatusCode::from_u16(UPGRADE_REJECTED_STATUS).unwrap_or(StatusCode::UNAUTHORIZED)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid {key} '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure raised by a collaborator (query handler, studio handler). Returned to the caller unchanged.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct DelegateError {
    pub status: StatusCode,
    pub message: String,
}

impl DelegateError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        DelegateError {
            status,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized request")]
    Unauthorized,
    #[error("WebSocket connections are not supported at this endpoint.")]
    UpgradeRejected,
    #[error("{0}")]
    InvalidSource(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
    #[error("not implemented: {0}")]
    NotImplemented(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Delegate(#[from] DelegateError),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::UpgradeRejected => upgrade_rejected_status(),
            AppError::InvalidSource(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Delegate(e) => e.status,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::UpgradeRejected => "upgrade_rejected",
            AppError::InvalidSource(_) => "invalid_source",
            AppError::BadRequest(_) => "bad_request",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::NotImplemented(_) => "not_implemented",
            AppError::Db(_) => "database_error",
            AppError::Delegate(_) => "delegate_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_distinct_statuses() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::UpgradeRejected.status().as_u16(), 440);
    }

    #[test]
    fn oversized_body_maps_to_413() {
        let err = AppError::PayloadTooLarge(16);
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.code(), "payload_too_large");
    }

    #[test]
    fn delegate_status_is_preserved() {
        let err = AppError::from(DelegateError::new(StatusCode::BAD_GATEWAY, "upstream down"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "upstream down");
    }
}
