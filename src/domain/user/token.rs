//! Single-use tokens for email verification and password reset

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Validity window of a verification or reset token
pub const ONE_TIME_TOKEN_TTL_HOURS: i64 = 24;

/// A random token stored on the user record with an absolute expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneTimeToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl OneTimeToken {
    /// Create a token valid for 24 hours from `issued_at`
    pub fn new(value: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at: issued_at + Duration::hours(ONE_TIME_TOKEN_TTL_HOURS),
        }
    }

    /// Rebuild a token from persisted parts
    pub fn from_parts(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Consume the token held in `slot`.
///
/// Checks run in order: empty slot (`NotFound`), wrong value (`Mismatch`),
/// past expiry (`Expired`). The slot is cleared only on success.
pub fn consume_token(
    slot: &mut Option<OneTimeToken>,
    supplied: &str,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    let token = match slot.as_ref() {
        Some(token) if !token.value.is_empty() => token,
        _ => return Err(DomainError::not_found("No pending token for this account")),
    };

    if !constant_time_eq(token.value.as_bytes(), supplied.as_bytes()) {
        return Err(DomainError::mismatch("Invalid token"));
    }

    if token.is_expired_at(now) {
        return Err(DomainError::expired(
            "Token expired. Please request a new one",
        ));
    }

    *slot = None;
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issued_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_expiry_is_24_hours() {
        let token = OneTimeToken::new("abc", issued_at());
        assert_eq!(token.expires_at() - issued_at(), Duration::hours(24));
    }

    #[test]
    fn test_consume_within_window() {
        let mut slot = Some(OneTimeToken::new("abc", issued_at()));

        consume_token(&mut slot, "abc", issued_at() + Duration::hours(23)).unwrap();
        assert!(slot.is_none());
    }

    #[test]
    fn test_consume_after_window() {
        let mut slot = Some(OneTimeToken::new("abc", issued_at()));

        let result = consume_token(&mut slot, "abc", issued_at() + Duration::hours(25));
        assert!(matches!(result, Err(DomainError::Expired { .. })));
        assert!(slot.is_some());
    }

    #[test]
    fn test_consume_wrong_value() {
        let mut slot = Some(OneTimeToken::new("abc", issued_at()));

        let result = consume_token(&mut slot, "abd", issued_at());
        assert!(matches!(result, Err(DomainError::Mismatch { .. })));

        let result = consume_token(&mut slot, "abcd", issued_at());
        assert!(matches!(result, Err(DomainError::Mismatch { .. })));
        assert!(slot.is_some());
    }

    #[test]
    fn test_consume_empty_slot() {
        let mut slot = None;
        let result = consume_token(&mut slot, "abc", issued_at());
        assert!(matches!(result, Err(DomainError::NotFound { .. })));

        let mut blank = Some(OneTimeToken::new("", issued_at()));
        let result = consume_token(&mut blank, "", issued_at());
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[test]
    fn test_replay_is_rejected() {
        let mut slot = Some(OneTimeToken::new("abc", issued_at()));

        consume_token(&mut slot, "abc", issued_at()).unwrap();
        let replay = consume_token(&mut slot, "abc", issued_at());
        assert!(matches!(replay, Err(DomainError::NotFound { .. })));
    }
}
