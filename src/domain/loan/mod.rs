//! Loan domain

mod entity;
mod repository;

pub use entity::{
    validate_amount, Loan, LoanId, LoanQuery, LoanStatus, SortOrder, MIN_LOAN_AMOUNT,
};
pub use repository::LoanRepository;

#[cfg(test)]
pub use repository::MockLoanRepository;
