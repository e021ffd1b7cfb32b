//! Admin API endpoints
//!
//! Every handler passes the subject to a service that loads the subject's
//! role from the store before doing anything else.

pub mod loans;
pub mod users;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        // User management
        .route("/users", get(users::list_users))
        .route("/users/{user_id}", delete(users::delete_user))
        // Loan review
        .route("/loans", get(loans::list_loans))
        .route("/loans/{loan_id}/review", post(loans::review_loan))
}
