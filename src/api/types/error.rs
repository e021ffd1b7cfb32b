//! Error envelope returned by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

/// `{"message": ..., "status": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    pub status: u16,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                message: message.into(),
                status: status.as_u16(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::BadCredentials { message }
            | DomainError::Unverified { message }
            | DomainError::Unauthorized { message } => Self::unauthorized(message),
            DomainError::Expired { message }
            | DomainError::Mismatch { message }
            | DomainError::InvalidAmount { message }
            | DomainError::InvalidPasswordFormat { message }
            | DomainError::Validation { message }
            | DomainError::Conflict { message } => Self::bad_request(message),
            DomainError::Timeout { message } => Self::new(StatusCode::GATEWAY_TIMEOUT, message),
            DomainError::EmailDeliveryFailed { message } => {
                Self::new(StatusCode::BAD_GATEWAY, message)
            }
            DomainError::StoreWriteFailed { message }
            | DomainError::Storage { message }
            | DomainError::Configuration { message }
            | DomainError::Internal { message } => {
                // Store and driver details stay in the log
                error!(error = %message, "Request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.response.message)
    }
}

impl std::error::Error for ApiError {}
