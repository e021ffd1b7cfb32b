//! Loan infrastructure module

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresLoanRepository;
pub use repository::InMemoryLoanRepository;
pub use service::LoanService;
