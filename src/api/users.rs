//! Account endpoints: registration, verification, login, profile and password reset

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::Subject;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse, Json};
use crate::domain::user::User;
use crate::infrastructure::auth::LoginIdentifier;
use crate::infrastructure::user::RegisterRequest;

/// Create the `/users` router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-email", get(verify_email))
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/password-reset", post(request_password_reset))
        .route("/password-update", post(update_password))
}

#[derive(Debug, Deserialize)]
pub struct RegisterApiRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailTokenQuery {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordUpdateRequest {
    pub new_password: String,
}

/// User fields safe to expose
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub created_at: String,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            contact: user.contact().map(String::from),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

pub(crate) fn query_error(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

/// POST /users/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterApiRequest>,
) -> Result<ApiResponse<ProfileResponse>, ApiError> {
    debug!(username = %request.username, "Registering user");

    let user = state
        .user_service
        .register(RegisterRequest {
            username: request.username,
            email: request.email,
            password: request.password,
            contact: request.contact,
        })
        .await?;

    Ok(ApiResponse::created(
        "User registered. Check your email to verify your account",
        ProfileResponse::from(&user),
    ))
}

/// GET /users/verify-email?email=&token=
pub async fn verify_email(
    State(state): State<AppState>,
    query: Result<Query<EmailTokenQuery>, QueryRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    let Query(query) = query.map_err(query_error)?;

    state
        .user_service
        .verify_email(&query.email, &query.token)
        .await?;

    Ok(ApiResponse::message("Email verified"))
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    let identifier = LoginIdentifier::from_parts(request.email, request.username)?;

    let tokens = state
        .user_service
        .login(&identifier, &request.password)
        .await?;

    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.access_expires_at.to_rfc3339(),
        },
    ))
}

/// GET /users/profile
pub async fn profile(
    State(state): State<AppState>,
    Subject(subject): Subject,
) -> Result<ApiResponse<ProfileResponse>, ApiError> {
    let user = state.user_service.profile(&subject).await?;

    Ok(ApiResponse::ok("Profile", ProfileResponse::from(&user)))
}

/// POST /users/password-reset
pub async fn request_password_reset(
    State(state): State<AppState>,
    Subject(subject): Subject,
    Json(request): Json<PasswordResetRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    state
        .user_service
        .request_password_reset(&subject, &request.email)
        .await?;

    Ok(ApiResponse::message("Password reset email sent"))
}

/// POST /users/password-update?email=&token=
pub async fn update_password(
    State(state): State<AppState>,
    Subject(subject): Subject,
    query: Result<Query<EmailTokenQuery>, QueryRejection>,
    Json(request): Json<PasswordUpdateRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    let Query(query) = query.map_err(query_error)?;

    state
        .user_service
        .reset_password(&subject, &query.email, &query.token, &request.new_password)
        .await?;

    Ok(ApiResponse::message("Password updated"))
}
