//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// One page of a listing, numbered from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_no: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: u64 = 10;
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// Build a page request, clamping to sane bounds
    pub fn new(page_no: u64, page_size: u64) -> Self {
        Self {
            page_no: page_no.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    /// Number of records to skip, capped at the largest offset a SQL store accepts
    pub fn offset(&self) -> u64 {
        (self.page_no - 1)
            .saturating_mul(self.page_size)
            .min(i64::MAX as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PAGE_SIZE)
    }
}

/// Credential store for user accounts
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by id
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by email address
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Store a new user; email and username must be unique
    async fn insert(&self, user: User) -> Result<User, DomainError>;

    /// Overwrite the stored user matching `user.email()`
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Delete a user, returning whether it existed
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// List users ordered by creation time
    async fn list(&self, page: PageRequest) -> Result<Vec<User>, DomainError>;

    /// Count all users
    async fn count(&self) -> Result<usize, DomainError>;
}
