//! Administrative user management

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::user::{PageRequest, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::require_admin;

/// A page of users plus the overall total
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub page_no: u64,
    pub page_size: u64,
    pub total: usize,
}

/// Admin-only user operations
#[derive(Debug)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
}

impl AdminService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// List users ordered by creation time
    pub async fn list_users(
        &self,
        subject: &UserId,
        page: PageRequest,
    ) -> Result<UserPage, DomainError> {
        require_admin(self.users.as_ref(), subject).await?;

        let users = self.users.list(page).await?;
        let total = self.users.count().await?;

        Ok(UserPage {
            users,
            page_no: page.page_no,
            page_size: page.page_size,
            total,
        })
    }

    /// Delete a user account
    pub async fn delete_user(&self, subject: &UserId, id: &UserId) -> Result<(), DomainError> {
        require_admin(self.users.as_ref(), subject).await?;

        if !self.users.delete(id).await? {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        info!(user_id = %id, admin = %subject, "User deleted");
        Ok(())
    }
}
