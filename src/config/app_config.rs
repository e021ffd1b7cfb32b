use serde::Deserialize;

use crate::domain::DomainError;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL used in links sent by email
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Token secrets and lifetimes
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_expiry_hours: u64,
    pub refresh_token_expiry_hours: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_secret", &"[REDACTED]")
            .field("refresh_token_secret", &"[REDACTED]")
            .field("access_token_expiry_hours", &self.access_token_expiry_hours)
            .field("refresh_token_expiry_hours", &self.refresh_token_expiry_hours)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub operation_timeout_secs: u64,
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_expiry_hours: 1,
            refresh_token_expiry_hours: 168,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            database_url: None,
            operation_timeout_secs: 10,
            max_connections: 10,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        self.auth.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

impl AuthConfig {
    /// Longest token lifetime accepted, ten years
    pub const MAX_TOKEN_EXPIRY_HOURS: u64 = 24 * 365 * 10;

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err(DomainError::configuration(
                "auth.access_token_secret and auth.refresh_token_secret must be set",
            ));
        }

        if self.access_token_secret == self.refresh_token_secret {
            return Err(DomainError::configuration(
                "Access and refresh token secrets must differ",
            ));
        }

        if self.access_token_expiry_hours == 0 || self.refresh_token_expiry_hours == 0 {
            return Err(DomainError::configuration(
                "Token expiry must be at least one hour",
            ));
        }

        if self.access_token_expiry_hours > Self::MAX_TOKEN_EXPIRY_HOURS
            || self.refresh_token_expiry_hours > Self::MAX_TOKEN_EXPIRY_HOURS
        {
            return Err(DomainError::configuration(format!(
                "Token expiry must not exceed {} hours",
                Self::MAX_TOKEN_EXPIRY_HOURS
            )));
        }

        Ok(())
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.backend == StoreBackend::Postgres
            && self.database_url.as_deref().is_none_or(str::is_empty)
        {
            return Err(DomainError::configuration(
                "store.database_url is required for the postgres backend",
            ));
        }

        if self.operation_timeout_secs == 0 {
            return Err(DomainError::configuration(
                "store.operation_timeout_secs must be positive",
            ));
        }

        Ok(())
    }
}
