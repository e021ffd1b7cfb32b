//! Schema migrations for the PostgreSQL store

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Applies versioned schema migrations, recording each in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Apply a migration unless it is already recorded
    pub async fn run_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
                .bind(migration.version)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to check migration status: {}", e))
                })?;

        if applied {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to start transaction: {}", e)))?;

        for statement in migration.statements {
            sqlx::query(statement).execute(&mut *tx).await.map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;
        }

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit migration: {}", e)))?;

        info!(version = migration.version, description = migration.description, "Applied migration");
        Ok(())
    }
}

/// A versioned schema change
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub statements: &'static [&'static str],
}

/// Schema for users and loans
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create users table",
        statements: &[
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username VARCHAR(50) NOT NULL,
                email VARCHAR(320) NOT NULL,
                password_hash TEXT NOT NULL,
                contact TEXT,
                is_verified BOOLEAN NOT NULL DEFAULT FALSE,
                role VARCHAR(16) NOT NULL DEFAULT 'user',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                verification_token TEXT,
                verification_token_expires_at TIMESTAMPTZ,
                reset_password_token TEXT,
                reset_password_token_expires_at TIMESTAMPTZ,
                CONSTRAINT users_username_key UNIQUE (username),
                CONSTRAINT users_email_key UNIQUE (email)
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_users_created_at ON users (created_at)",
        ],
    },
    Migration {
        version: 2,
        description: "Create loans table",
        statements: &[
            r#"
            CREATE TABLE IF NOT EXISTS loans (
                id UUID PRIMARY KEY,
                amount DOUBLE PRECISION NOT NULL CHECK (amount >= 1),
                user_id UUID NOT NULL,
                status VARCHAR(16) NOT NULL DEFAULT 'pending',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                seq BIGSERIAL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_loans_status_created_at ON loans (status, created_at)",
            "CREATE INDEX IF NOT EXISTS idx_loans_user_id ON loans (user_id)",
        ],
    },
];

/// Run every schema migration in order
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());

    for migration in MIGRATIONS {
        migrator.run_migration(migration).await?;
    }

    Ok(())
}
