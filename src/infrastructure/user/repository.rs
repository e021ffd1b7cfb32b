//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{PageRequest, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    /// email -> user ID
    email_index: HashMap<String, UserId>,
    /// username -> user ID
    username_index: HashMap<String, UserId>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .username_index
            .get(username)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.users.contains_key(user.id()) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                user.id()
            )));
        }

        if table.email_index.contains_key(user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                user.email()
            )));
        }

        if table.username_index.contains_key(user.username()) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                user.username()
            )));
        }

        table.email_index.insert(user.email().to_string(), *user.id());
        table
            .username_index
            .insert(user.username().to_string(), *user.id());
        table.users.insert(*user.id(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        let id = *table
            .email_index
            .get(user.email())
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", user.email())))?;

        let old_username = table
            .users
            .get(&id)
            .map(|u| u.username().to_string())
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", user.email())))?;

        if old_username != user.username() {
            if table.username_index.contains_key(user.username()) {
                return Err(DomainError::conflict(format!(
                    "Username '{}' already exists",
                    user.username()
                )));
            }

            table.username_index.remove(&old_username);
            table.username_index.insert(user.username().to_string(), id);
        }

        // The stored identity is kept even if the caller's copy differs
        let mut stored = user.clone();
        if stored.id() != &id {
            stored = User::restore(
                id,
                user.username().to_string(),
                user.email().to_string(),
                user.password_hash().to_string(),
                user.contact().map(String::from),
                user.is_verified(),
                user.role(),
                user.created_at(),
                user.verification_token().cloned(),
                user.reset_password_token().cloned(),
            );
        }

        table.users.insert(id, stored.clone());

        Ok(stored)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.users.remove(id) {
            Some(user) => {
                table.email_index.remove(user.email());
                table.username_index.remove(user.username());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;

        let mut users: Vec<User> = table.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at());

        Ok(users
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.page_size as usize)
            .collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.table.read().await.users.len())
    }
}
