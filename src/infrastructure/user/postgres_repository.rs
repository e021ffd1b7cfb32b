//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::user::{OneTimeToken, PageRequest, Role, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::{read_error, write_error, OperationTimeout};

const USER_COLUMNS: &str = "id, username, email, password_hash, contact, is_verified, role, \
    created_at, verification_token, verification_token_expires_at, \
    reset_password_token, reset_password_token_expires_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
    timeout: OperationTimeout,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool, timeout: OperationTimeout) -> Self {
        Self { pool, timeout }
    }

    async fn find_one(
        &self,
        operation: &str,
        column: &str,
        bind: FindKey<'_>,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);

        self.timeout
            .run(operation, async {
                let query = sqlx::query(&sql);
                let query = match bind {
                    FindKey::Id(id) => query.bind(id),
                    FindKey::Text(value) => query.bind(value),
                };

                let row = query
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| read_error("Failed to get user", e))?;

                row.as_ref().map(row_to_user).transpose()
            })
            .await
    }
}

enum FindKey<'a> {
    Id(Uuid),
    Text(&'a str),
}

fn conflict_for(user: &User) -> impl FnOnce(&str) -> DomainError + '_ {
    move |constraint| {
        if constraint.contains("username") {
            DomainError::conflict(format!("Username '{}' already exists", user.username()))
        } else if constraint.contains("email") {
            DomainError::conflict(format!("Email '{}' already exists", user.email()))
        } else {
            DomainError::conflict(format!("User with ID '{}' already exists", user.id()))
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.find_one("find_user_by_id", "id", FindKey::Id(id.as_uuid()))
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("find_user_by_email", "email", FindKey::Text(email))
            .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.find_one("find_user_by_username", "username", FindKey::Text(username))
            .await
    }

    async fn insert(&self, user: User) -> Result<User, DomainError> {
        let (verification_token, verification_expires) = token_columns(user.verification_token());
        let (reset_token, reset_expires) = token_columns(user.reset_password_token());

        self.timeout
            .run("insert_user", async {
                sqlx::query(
                    r#"
                    INSERT INTO users (id, username, email, password_hash, contact, is_verified,
                                       role, created_at, verification_token,
                                       verification_token_expires_at, reset_password_token,
                                       reset_password_token_expires_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                    "#,
                )
                .bind(user.id().as_uuid())
                .bind(user.username())
                .bind(user.email())
                .bind(user.password_hash())
                .bind(user.contact())
                .bind(user.is_verified())
                .bind(user.role().as_str())
                .bind(user.created_at())
                .bind(verification_token)
                .bind(verification_expires)
                .bind(reset_token)
                .bind(reset_expires)
                .execute(&self.pool)
                .await
                .map_err(|e| write_error(e, conflict_for(&user)))?;

                Ok(())
            })
            .await?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let (verification_token, verification_expires) = token_columns(user.verification_token());
        let (reset_token, reset_expires) = token_columns(user.reset_password_token());

        let row = self
            .timeout
            .run("update_user", async {
                sqlx::query(&format!(
                    r#"
                    UPDATE users
                    SET username = $2, password_hash = $3, contact = $4, is_verified = $5,
                        role = $6, verification_token = $7, verification_token_expires_at = $8,
                        reset_password_token = $9, reset_password_token_expires_at = $10
                    WHERE email = $1
                    RETURNING {}
                    "#,
                    USER_COLUMNS
                ))
                .bind(user.email())
                .bind(user.username())
                .bind(user.password_hash())
                .bind(user.contact())
                .bind(user.is_verified())
                .bind(user.role().as_str())
                .bind(verification_token)
                .bind(verification_expires)
                .bind(reset_token)
                .bind(reset_expires)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| write_error(e, conflict_for(user)))
            })
            .await?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.email()
            ))),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        self.timeout
            .run("delete_user", async {
                let result = sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id.as_uuid())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| DomainError::store_write_failed(format!("Failed to delete user: {}", e)))?;

                Ok(result.rows_affected() > 0)
            })
            .await
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );

        self.timeout
            .run("list_users", async {
                let rows = sqlx::query(&sql)
                    .bind(page.page_size as i64)
                    .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| read_error("Failed to list users", e))?;

                rows.iter().map(row_to_user).collect()
            })
            .await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        self.timeout
            .run("count_users", async {
                let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| read_error("Failed to count users", e))?;

                Ok(count as usize)
            })
            .await
    }
}

fn token_columns(token: Option<&OneTimeToken>) -> (Option<String>, Option<DateTime<Utc>>) {
    match token {
        Some(token) => (Some(token.value().to_string()), Some(token.expires_at())),
        None => (None, None),
    }
}

fn token_from_columns(
    value: Option<String>,
    expires_at: Option<DateTime<Utc>>,
) -> Option<OneTimeToken> {
    match (value, expires_at) {
        (Some(value), Some(expires_at)) => Some(OneTimeToken::from_parts(value, expires_at)),
        _ => None,
    }
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let field = |e: sqlx::Error| read_error("Failed to decode user row", e);

    let id: Uuid = row.try_get("id").map_err(field)?;
    let role: String = row.try_get("role").map_err(field)?;

    Ok(User::restore(
        UserId::from(id),
        row.try_get("username").map_err(field)?,
        row.try_get("email").map_err(field)?,
        row.try_get("password_hash").map_err(field)?,
        row.try_get("contact").map_err(field)?,
        row.try_get("is_verified").map_err(field)?,
        role.parse::<Role>()?,
        row.try_get("created_at").map_err(field)?,
        token_from_columns(
            row.try_get("verification_token").map_err(field)?,
            row.try_get("verification_token_expires_at").map_err(field)?,
        ),
        token_from_columns(
            row.try_get("reset_password_token").map_err(field)?,
            row.try_get("reset_password_token_expires_at").map_err(field)?,
        ),
    ))
}
