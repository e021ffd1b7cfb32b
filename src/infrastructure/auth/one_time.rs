//! Verification and password-reset token generation
//!
//! Tokens are random, URL-safe and valid for 24 hours. They are stored on the
//! user record and consumed through `User::verify_email` / `User::reset_password`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::domain::user::OneTimeToken;

/// Generator for single-use account tokens
#[derive(Debug, Clone)]
pub struct OneTimeTokenIssuer {
    /// Number of random bytes per token
    token_bytes: usize,
}

impl OneTimeTokenIssuer {
    pub fn new() -> Self {
        Self { token_bytes: 32 }
    }

    /// Set the number of random bytes
    pub fn with_token_bytes(mut self, bytes: usize) -> Self {
        self.token_bytes = bytes;
        self
    }

    /// Issue a token valid for 24 hours from `now`
    pub fn issue(&self, now: DateTime<Utc>) -> OneTimeToken {
        let mut random_bytes = vec![0u8; self.token_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        OneTimeToken::new(URL_SAFE_NO_PAD.encode(&random_bytes), now)
    }
}

impl Default for OneTimeTokenIssuer {
    fn default() -> Self {
        Self::new()
    }
}
