//! PostgreSQL connection pooling and bounded store operations

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use crate::domain::DomainError;

/// PostgreSQL store configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/loan_tracker".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Open a connection pool
    pub async fn connect(&self) -> Result<PgPool, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .connect(&self.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!(max_connections = self.max_connections, "PostgreSQL pool ready");
        Ok(pool)
    }
}

/// Upper bound on a single store round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimeout(Duration);

impl OperationTimeout {
    pub const DEFAULT_SECS: u64 = 10;

    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    /// Run `operation`, failing with `Timeout` once the bound elapses
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match tokio::time::timeout(self.0, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = self.0.as_millis() as u64, "Store operation timed out");
                Err(DomainError::timeout(format!(
                    "Store operation '{}' timed out",
                    operation
                )))
            }
        }
    }
}

impl Default for OperationTimeout {
    fn default() -> Self {
        Self::from_secs(Self::DEFAULT_SECS)
    }
}

/// Map a failed write, keeping unique-constraint violations distinct
pub(crate) fn write_error(e: sqlx::Error, conflict: impl FnOnce(&str) -> DomainError) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return conflict(db.constraint().unwrap_or_default());
        }
    }
    DomainError::store_write_failed(e.to_string())
}

/// Map a failed read
pub(crate) fn read_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::storage(format!("{}: {}", context, e))
}
