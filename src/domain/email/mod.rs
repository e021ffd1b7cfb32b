//! Outbound email collaborator

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Delivers account emails. Failures surface as `EmailDeliveryFailed`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmailSender: Send + Sync + Debug {
    /// Send the email-verification link
    async fn send_verification_email(&self, address: &str, token: &str) -> Result<(), DomainError>;

    /// Send the password-reset link
    async fn send_reset_email(&self, address: &str, token: &str) -> Result<(), DomainError>;
}
