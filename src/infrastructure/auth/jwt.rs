//! JWT token generation and validation for access and refresh tokens

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    /// Create new claims for a subject expiring `expiration_hours` from now
    pub fn new(subject: &UserId, expiration_hours: u64) -> Result<Self, DomainError> {
        let now = Utc::now();
        let exp = i64::try_from(expiration_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "Token expiry of {} hours is out of range",
                    expiration_hours
                ))
            })?;

        Ok(Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Parse the subject back into a user ID
    pub fn subject(&self) -> Result<UserId, TokenError> {
        UserId::parse(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

/// Why a token failed verification
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token could not be decoded")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

impl From<TokenError> for DomainError {
    // Callers only ever see one failure for a bad token
    fn from(_: TokenError) -> Self {
        DomainError::unauthorized("Invalid or expired token")
    }
}

/// Which secret and lifetime a token is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Configuration for one token class
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: u64,
}

impl JwtConfig {
    /// Create new JWT configuration
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

/// A signed token and the instant its `exp` claim points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies subject tokens
pub trait TokenCodec: Send + Sync + Debug {
    /// Issue a token for the subject
    fn issue(&self, subject: &UserId) -> Result<IssuedToken, DomainError>;

    /// Verify the token and return its claims
    fn verify(&self, token: &str) -> Result<JwtClaims, TokenError>;
}

/// HS256 JWT service bound to one secret
#[derive(Clone)]
pub struct JwtService {
    kind: TokenKind,
    expiration_hours: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("kind", &self.kind)
            .field("expiration_hours", &self.expiration_hours)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(kind: TokenKind, config: &JwtConfig) -> Self {
        Self {
            kind,
            expiration_hours: config.expiration_hours,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation
    }
}

impl TokenCodec for JwtService {
    fn issue(&self, subject: &UserId) -> Result<IssuedToken, DomainError> {
        let claims = JwtClaims::new(subject, self.expiration_hours)?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| DomainError::internal("Token expiry is not representable"))?;

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &Self::validation())?;
        Ok(token_data.claims)
    }
}
