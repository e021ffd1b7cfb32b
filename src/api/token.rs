//! Access-token renewal

use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Subject;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse, Json};

/// Create the `/token` router
pub fn create_token_router() -> Router<AppState> {
    Router::new().route("/refresh", post(refresh))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// POST /token/refresh
///
/// The claimed subject is the bearer of the access token; the refresh token
/// must belong to the same user.
pub async fn refresh(
    State(state): State<AppState>,
    Subject(subject): Subject,
    Json(request): Json<RefreshRequest>,
) -> Result<ApiResponse<RefreshResponse>, ApiError> {
    let access_token = state
        .user_service
        .refresh_token(&subject, &request.refresh_token)
        .await?;

    Ok(ApiResponse::ok(
        "Token refreshed",
        RefreshResponse { access_token },
    ))
}
