//! In-memory loan repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::loan::{Loan, LoanId, LoanQuery, LoanRepository, SortOrder};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct LoanTable {
    loans: HashMap<LoanId, Loan>,
    /// Insertion order, the natural order of an unsorted listing
    order: Vec<LoanId>,
}

/// In-memory implementation of LoanRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryLoanRepository {
    table: Arc<RwLock<LoanTable>>,
}

impl InMemoryLoanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanRepository for InMemoryLoanRepository {
    async fn insert(&self, loan: Loan) -> Result<Loan, DomainError> {
        let mut table = self.table.write().await;

        if table.loans.contains_key(loan.id()) {
            return Err(DomainError::conflict(format!(
                "Loan with ID '{}' already exists",
                loan.id()
            )));
        }

        table.order.push(*loan.id());
        table.loans.insert(*loan.id(), loan.clone());

        Ok(loan)
    }

    async fn update(&self, loan: &Loan) -> Result<Loan, DomainError> {
        let mut table = self.table.write().await;

        let stored = table
            .loans
            .get_mut(loan.id())
            .ok_or_else(|| DomainError::not_found(format!("Loan '{}' not found", loan.id())))?;

        if stored.user_id() != loan.user_id() {
            return Err(DomainError::validation("Loan owner cannot change"));
        }

        *stored = loan.clone();
        Ok(loan.clone())
    }

    async fn find_by_id(&self, id: &LoanId) -> Result<Option<Loan>, DomainError> {
        let table = self.table.read().await;
        Ok(table.loans.get(id).cloned())
    }

    async fn list(&self, query: LoanQuery) -> Result<Vec<Loan>, DomainError> {
        let table = self.table.read().await;

        let mut loans: Vec<Loan> = table
            .order
            .iter()
            .filter_map(|id| table.loans.get(id))
            .filter(|loan| query.matches(loan))
            .cloned()
            .collect();

        // Stable sorts keep insertion order among equal timestamps
        match query.effective_order() {
            Some(SortOrder::Ascending) => loans.sort_by_key(|l| l.created_at()),
            Some(SortOrder::Descending) => {
                loans.sort_by(|a, b| b.created_at().cmp(&a.created_at()))
            }
            None => {}
        }

        Ok(loans)
    }
}
