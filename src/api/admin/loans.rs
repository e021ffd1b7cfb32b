//! Loan review admin endpoints

use axum::extract::{rejection::QueryRejection, Path, Query, State};
use serde::Deserialize;

use crate::api::loans::LoanResponse;
use crate::api::middleware::Subject;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse};
use crate::api::users::query_error;
use crate::domain::loan::{LoanId, LoanQuery, LoanStatus, SortOrder};
use crate::domain::DomainError;

#[derive(Debug, Default, Deserialize)]
pub struct ListLoansQuery {
    pub status: Option<String>,
    pub order: Option<String>,
}

impl ListLoansQuery {
    fn parse(&self) -> Result<LoanQuery, DomainError> {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        let status = non_empty(&self.status)
            .map(|s| s.parse::<LoanStatus>())
            .transpose()?;
        let order = non_empty(&self.order)
            .map(|s| s.parse::<SortOrder>())
            .transpose()?;

        Ok(LoanQuery::new(status, order))
    }
}

/// GET /admin/loans?status=&order=
pub async fn list_loans(
    State(state): State<AppState>,
    Subject(subject): Subject,
    query: Result<Query<ListLoansQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<LoanResponse>>, ApiError> {
    let Query(query) = query.map_err(query_error)?;
    let query = query.parse()?;

    let loans = state.loan_service.list_loans(&subject, query).await?;

    Ok(ApiResponse::ok(
        "Loans",
        loans.iter().map(LoanResponse::from).collect(),
    ))
}

/// POST /admin/loans/{loan_id}/review
pub async fn review_loan(
    State(state): State<AppState>,
    Subject(subject): Subject,
    Path(loan_id): Path<String>,
) -> Result<ApiResponse<LoanResponse>, ApiError> {
    let loan_id = LoanId::parse(&loan_id)?;

    let loan = state.loan_service.review_loan(&subject, &loan_id).await?;

    Ok(ApiResponse::ok("Loan reviewed", LoanResponse::from(&loan)))
}
