//! Email delivery adapters

use async_trait::async_trait;
use tracing::info;

use crate::domain::email::EmailSender;
use crate::domain::DomainError;

/// Delivers account emails to the log under the `mail` target.
///
/// Stand-in for an SMTP relay: the message body, including the link, is the
/// only place the token appears.
#[derive(Debug, Clone)]
pub struct LogEmailSender {
    base_url: String,
}

impl LogEmailSender {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn verification_link(&self, address: &str, token: &str) -> String {
        format!(
            "{}/users/verify-email?email={}&token={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(token)
        )
    }

    fn reset_link(&self, address: &str, token: &str) -> String {
        format!(
            "{}/users/password-update?email={}&token={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(token)
        )
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_verification_email(&self, address: &str, token: &str) -> Result<(), DomainError> {
        if address.is_empty() {
            return Err(DomainError::email_delivery_failed("Recipient address is empty"));
        }

        info!(
            target: "mail",
            to = %address,
            subject = "Verify your account",
            body = %format!("Open {} to verify your email address.", self.verification_link(address, token)),
            "Email delivered"
        );
        Ok(())
    }

    async fn send_reset_email(&self, address: &str, token: &str) -> Result<(), DomainError> {
        if address.is_empty() {
            return Err(DomainError::email_delivery_failed("Recipient address is empty"));
        }

        info!(
            target: "mail",
            to = %address,
            subject = "Reset your password",
            body = %format!("Use token {} at {} to set a new password.", token, self.reset_link(address, token)),
            "Email delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::Uri;

    fn query_of(link: &str) -> HashMap<String, String> {
        let uri: Uri = link.parse().unwrap();
        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&uri).unwrap();
        params
    }

    #[test]
    fn test_links() {
        let sender = LogEmailSender::new("http://localhost:8080/");

        assert_eq!(
            sender.verification_link("jane+1@example.com", "abc"),
            "http://localhost:8080/users/verify-email?email=jane%2B1%40example.com&token=abc"
        );
        assert_eq!(
            sender.reset_link("jane@example.com", "xyz"),
            "http://localhost:8080/users/password-update?email=jane%40example.com&token=xyz"
        );
    }

    #[test]
    fn test_links_decode_to_the_original_address() {
        let sender = LogEmailSender::new("http://localhost:8080");

        for address in ["jane%2Bx@example.com", "a+b&c=d@example.com", "jane@example.com"] {
            let params = query_of(&sender.verification_link(address, "t0k-en_"));
            assert_eq!(params["email"], address);
            assert_eq!(params["token"], "t0k-en_");

            let params = query_of(&sender.reset_link(address, "t0k-en_"));
            assert_eq!(params["email"], address);
        }
    }

    #[tokio::test]
    async fn test_send() {
        let sender = LogEmailSender::new("http://localhost:8080");

        assert!(sender.send_verification_email("jane@example.com", "abc").await.is_ok());
        assert!(sender.send_reset_email("jane@example.com", "abc").await.is_ok());

        let result = sender.send_reset_email("", "abc").await;
        assert!(matches!(result, Err(DomainError::EmailDeliveryFailed { .. })));
    }
}
