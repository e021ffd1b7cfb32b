//! Loan repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Loan, LoanId, LoanQuery};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Persistence for loan applications
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LoanRepository: Send + Sync + Debug {
    /// Store a new loan
    async fn insert(&self, loan: Loan) -> Result<Loan, DomainError>;

    /// Overwrite a stored loan; its owner never changes
    async fn update(&self, loan: &Loan) -> Result<Loan, DomainError>;

    /// Get a loan by id
    async fn find_by_id(&self, id: &LoanId) -> Result<Option<Loan>, DomainError>;

    /// List loans matching the status filter, sorted by `query.effective_order()`
    async fn list(&self, query: LoanQuery) -> Result<Vec<Loan>, DomainError>;
}
