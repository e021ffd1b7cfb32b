//! Success envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// `{"message": ..., "status": ..., "data": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            status: status.as_u16(),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// Envelope without a `data` field
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_only_omits_data() {
        let json = serde_json::to_value(ApiResponse::message("Logged out")).unwrap();

        assert_eq!(json["message"], "Logged out");
        assert_eq!(json["status"], 200);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_created_status() {
        let response = ApiResponse::created("Loan created", serde_json::json!({"id": 1}));
        assert_eq!(response.status, 201);

        let http = response.into_response();
        assert_eq!(http.status(), StatusCode::CREATED);
    }
}
