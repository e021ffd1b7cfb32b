use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid credentials: {message}")]
    BadCredentials { message: String },

    #[error("User not verified: {message}")]
    Unverified { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Token expired: {message}")]
    Expired { message: String },

    #[error("Token mismatch: {message}")]
    Mismatch { message: String },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Invalid password format: {message}")]
    InvalidPasswordFormat { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Email delivery failed: {message}")]
    EmailDeliveryFailed { message: String },

    #[error("Store write failed: {message}")]
    StoreWriteFailed { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn bad_credentials(message: impl Into<String>) -> Self {
        Self::BadCredentials {
            message: message.into(),
        }
    }

    pub fn unverified(message: impl Into<String>) -> Self {
        Self::Unverified {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn expired(message: impl Into<String>) -> Self {
        Self::Expired {
            message: message.into(),
        }
    }

    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::Mismatch {
            message: message.into(),
        }
    }

    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    pub fn invalid_password_format(message: impl Into<String>) -> Self {
        Self::InvalidPasswordFormat {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn email_delivery_failed(message: impl Into<String>) -> Self {
        Self::EmailDeliveryFailed {
            message: message.into(),
        }
    }

    pub fn store_write_failed(message: impl Into<String>) -> Self {
        Self::StoreWriteFailed {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Transient failures a caller may choose to retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::StoreWriteFailed { .. })
    }
}
