//! Loan endpoints for applicants

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::Subject;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse, Json};
use crate::domain::loan::{Loan, LoanId, LoanStatus};
use crate::domain::user::UserId;

/// Create the loan routes, mounted at the root
pub fn create_loans_router() -> Router<AppState> {
    Router::new()
        .route("/loans", post(create_loan))
        .route("/loans/{loan_id}", get(loan_status))
}

#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub amount: f64,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub id: String,
    pub amount: f64,
    pub user_id: String,
    pub status: LoanStatus,
    pub created_at: String,
}

impl From<&Loan> for LoanResponse {
    fn from(loan: &Loan) -> Self {
        Self {
            id: loan.id().to_string(),
            amount: loan.amount(),
            user_id: loan.user_id().to_string(),
            status: loan.status(),
            created_at: loan.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoanStatusResponse {
    pub status: LoanStatus,
}

/// POST /loans
pub async fn create_loan(
    State(state): State<AppState>,
    Subject(subject): Subject,
    Json(request): Json<CreateLoanRequest>,
) -> Result<ApiResponse<LoanResponse>, ApiError> {
    let owner = UserId::parse(&request.user_id)?;
    debug!(user_id = %owner, "Creating loan");

    let loan = state
        .loan_service
        .create_loan(&subject, &owner, request.amount)
        .await?;

    Ok(ApiResponse::created("Loan created", LoanResponse::from(&loan)))
}

/// GET /loans/{loan_id}
pub async fn loan_status(
    State(state): State<AppState>,
    Subject(subject): Subject,
    Path(loan_id): Path<String>,
) -> Result<ApiResponse<LoanStatusResponse>, ApiError> {
    let loan_id = LoanId::parse(&loan_id)?;

    let loan = state.loan_service.check_status(&subject, &loan_id).await?;

    Ok(ApiResponse::ok(
        "Loan status",
        LoanStatusResponse {
            status: loan.status(),
        },
    ))
}
