use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::loans;
use super::middleware::logging_middleware;
use super::state::AppState;
use super::token;
use super::users;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        // Account endpoints; login, registration and verification are public
        .nest("/users", users::create_users_router())
        .nest("/token", token::create_token_router())
        .merge(loans::create_loans_router())
        .nest("/admin", admin::create_admin_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
