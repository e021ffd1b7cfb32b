//! Domain layer - entities, rules and the traits adapters implement

pub mod email;
pub mod error;
pub mod loan;
pub mod user;

pub use email::EmailSender;
pub use error::DomainError;
pub use loan::{Loan, LoanId, LoanQuery, LoanRepository, LoanStatus, SortOrder};
pub use user::{OneTimeToken, PageRequest, Role, User, UserId, UserRepository};
