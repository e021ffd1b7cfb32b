//! Loan service: application, status check and administrative review

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::loan::{validate_amount, Loan, LoanId, LoanQuery, LoanRepository};
use crate::domain::user::{UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::{require_admin, require_owner};

/// Loan use cases; every call takes the authenticated subject explicitly
#[derive(Debug)]
pub struct LoanService {
    loans: Arc<dyn LoanRepository>,
    users: Arc<dyn UserRepository>,
}

impl LoanService {
    pub fn new(loans: Arc<dyn LoanRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { loans, users }
    }

    /// Apply for a loan on behalf of `owner`, who must be the subject
    pub async fn create_loan(
        &self,
        subject: &UserId,
        owner: &UserId,
        amount: f64,
    ) -> Result<Loan, DomainError> {
        require_owner(owner, subject)?;
        validate_amount(amount)?;

        let loan = self.loans.insert(Loan::new(amount, *owner)?).await?;

        info!(loan_id = %loan.id(), user_id = %owner, amount, "Loan created");
        Ok(loan)
    }

    /// Status of a loan owned by the subject
    pub async fn check_status(
        &self,
        subject: &UserId,
        loan_id: &LoanId,
    ) -> Result<Loan, DomainError> {
        let loan = self
            .loans
            .find_by_id(loan_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Loan '{}' not found", loan_id)))?;

        require_owner(loan.user_id(), subject)?;

        Ok(loan)
    }

    /// All loans matching `query`; admin only
    pub async fn list_loans(
        &self,
        subject: &UserId,
        query: LoanQuery,
    ) -> Result<Vec<Loan>, DomainError> {
        require_admin(self.users.as_ref(), subject).await?;

        debug!(status = ?query.status, order = ?query.effective_order(), "Listing loans");
        self.loans.list(query).await
    }

    /// Move a pending loan to `reviewed`; admin only
    pub async fn review_loan(
        &self,
        subject: &UserId,
        loan_id: &LoanId,
    ) -> Result<Loan, DomainError> {
        require_admin(self.users.as_ref(), subject).await?;

        let mut loan = self
            .loans
            .find_by_id(loan_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Loan '{}' not found", loan_id)))?;

        loan.mark_reviewed()?;
        let loan = self.loans.update(&loan).await?;

        info!(loan_id = %loan.id(), reviewer = %subject, "Loan reviewed");
        Ok(loan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::loan::{LoanStatus, MockLoanRepository, SortOrder};
    use crate::domain::user::{Role, User};
    use crate::infrastructure::loan::InMemoryLoanRepository;
    use crate::infrastructure::user::InMemoryUserRepository;

    struct Fixture {
        service: LoanService,
        admin: UserId,
        alice: UserId,
        bob: UserId,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());

        let mut admin = User::new("root", "root@example.com", "hash", None);
        admin.set_role(Role::Admin);
        let admin = users.insert(admin).await.unwrap();
        let alice = users
            .insert(User::new("alice", "alice@example.com", "hash", None))
            .await
            .unwrap();
        let bob = users
            .insert(User::new("bob", "bob@example.com", "hash", None))
            .await
            .unwrap();

        Fixture {
            service: LoanService::new(Arc::new(InMemoryLoanRepository::new()), users),
            admin: *admin.id(),
            alice: *alice.id(),
            bob: *bob.id(),
        }
    }

    #[tokio::test]
    async fn test_create_loan_for_self() {
        let f = fixture().await;

        let loan = f.service.create_loan(&f.alice, &f.alice, 100.0).await.unwrap();

        assert_eq!(loan.status(), LoanStatus::Pending);
        assert_eq!(loan.user_id(), &f.alice);
        assert_eq!(loan.amount(), 100.0);
    }

    #[tokio::test]
    async fn test_create_loan_for_someone_else() {
        let f = fixture().await;

        let result = f.service.create_loan(&f.alice, &f.bob, 100.0).await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_ownership_checked_before_amount() {
        let f = fixture().await;

        let result = f.service.create_loan(&f.alice, &f.bob, 0.0).await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_create_loan_invalid_amounts() {
        let f = fixture().await;

        for amount in [0.0, -5.0, 0.5, f64::NAN, f64::INFINITY] {
            let result = f.service.create_loan(&f.alice, &f.alice, amount).await;
            assert!(
                matches!(result, Err(DomainError::InvalidAmount { .. })),
                "amount {} accepted",
                amount
            );
        }
    }

    #[tokio::test]
    async fn test_check_status() {
        let f = fixture().await;
        let loan = f.service.create_loan(&f.alice, &f.alice, 100.0).await.unwrap();

        let found = f.service.check_status(&f.alice, loan.id()).await.unwrap();
        assert_eq!(found.status(), LoanStatus::Pending);

        let other = f.service.check_status(&f.bob, loan.id()).await;
        assert!(matches!(other, Err(DomainError::Unauthorized { .. })));

        let missing = f.service.check_status(&f.alice, &LoanId::generate()).await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_loans_requires_admin() {
        let f = fixture().await;

        let result = f.service.list_loans(&f.alice, LoanQuery::default()).await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_admin_lists_by_status() {
        let f = fixture().await;
        let first = f.service.create_loan(&f.alice, &f.alice, 100.0).await.unwrap();
        let second = f.service.create_loan(&f.bob, &f.bob, 200.0).await.unwrap();
        let third = f.service.create_loan(&f.alice, &f.alice, 300.0).await.unwrap();

        f.service.review_loan(&f.admin, second.id()).await.unwrap();

        let pending = f
            .service
            .list_loans(&f.admin, LoanQuery::new(Some(LoanStatus::Pending), None))
            .await
            .unwrap();
        let ids: Vec<_> = pending.iter().map(|l| *l.id()).collect();
        assert_eq!(ids, vec![*first.id(), *third.id()]);

        let reviewed = f
            .service
            .list_loans(
                &f.admin,
                LoanQuery::new(Some(LoanStatus::Reviewed), Some(SortOrder::Ascending)),
            )
            .await
            .unwrap();
        assert_eq!(reviewed.len(), 1);
        assert_eq!(reviewed[0].id(), second.id());
    }

    #[tokio::test]
    async fn test_review_is_terminal() {
        let f = fixture().await;
        let loan = f.service.create_loan(&f.alice, &f.alice, 100.0).await.unwrap();

        let reviewed = f.service.review_loan(&f.admin, loan.id()).await.unwrap();
        assert_eq!(reviewed.status(), LoanStatus::Reviewed);

        let again = f.service.review_loan(&f.admin, loan.id()).await;
        assert!(matches!(again, Err(DomainError::Validation { .. })));

        let by_owner = f.service.review_loan(&f.alice, loan.id()).await;
        assert!(matches!(by_owner, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_store_timeout_surfaces() {
        let users = Arc::new(InMemoryUserRepository::new());
        let alice = users
            .insert(User::new("alice", "alice@example.com", "hash", None))
            .await
            .unwrap();

        let mut loans = MockLoanRepository::new();
        loans
            .expect_insert()
            .returning(|_| Err(DomainError::timeout("insert_loan timed out")));

        let service = LoanService::new(Arc::new(loans), users);
        let result = service.create_loan(alice.id(), alice.id(), 100.0).await;
        assert!(matches!(result, Err(DomainError::Timeout { .. })));
    }
}
