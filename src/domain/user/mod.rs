//! User domain
//!
//! Account entity, single-use verification/reset tokens, validation rules
//! and the credential store trait.

mod entity;
mod repository;
mod token;
mod validation;

pub use entity::{Role, User, UserId};
pub use repository::{PageRequest, UserRepository};
pub use token::{consume_token, OneTimeToken, ONE_TIME_TOKEN_TTL_HOURS};
pub use validation::{validate_email, validate_password, validate_username, UserValidationError};

#[cfg(test)]
pub use repository::MockUserRepository;
