//! User entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::token::{consume_token, OneTimeToken};
use crate::domain::DomainError;

/// User identifier - a UUID assigned at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| DomainError::validation(format!("Invalid user id '{}'", id)))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact: Option<String>,
    is_verified: bool,
    role: Role,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    verification_token: Option<OneTimeToken>,
    #[serde(skip)]
    reset_password_token: Option<OneTimeToken>,
}

impl User {
    /// Create a new, unverified user with the `user` role
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        contact: Option<String>,
    ) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            contact,
            is_verified: false,
            role: Role::User,
            created_at: Utc::now(),
            verification_token: None,
            reset_password_token: None,
        }
    }

    /// Rebuild a user from persisted state
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: UserId,
        username: String,
        email: String,
        password_hash: String,
        contact: Option<String>,
        is_verified: bool,
        role: Role,
        created_at: DateTime<Utc>,
        verification_token: Option<OneTimeToken>,
        reset_password_token: Option<OneTimeToken>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            contact,
            is_verified,
            role,
            created_at,
            verification_token,
            reset_password_token,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn verification_token(&self) -> Option<&OneTimeToken> {
        self.verification_token.as_ref()
    }

    pub fn reset_password_token(&self) -> Option<&OneTimeToken> {
        self.reset_password_token.as_ref()
    }

    // Mutators

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Mark the account verified without a token (bootstrap accounts)
    pub fn mark_verified(&mut self) {
        self.is_verified = true;
        self.verification_token = None;
    }

    pub fn set_verification_token(&mut self, token: OneTimeToken) {
        self.verification_token = Some(token);
    }

    pub fn set_reset_password_token(&mut self, token: OneTimeToken) {
        self.reset_password_token = Some(token);
    }

    /// Consume the verification token and mark the account verified
    pub fn verify_email(&mut self, supplied: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        consume_token(&mut self.verification_token, supplied, now)?;
        self.is_verified = true;
        Ok(())
    }

    /// Consume the reset token, then install the hash produced by `hash`.
    ///
    /// `hash` only runs once the token has been accepted.
    pub fn reset_password<F>(
        &mut self,
        supplied: &str,
        now: DateTime<Utc>,
        hash: F,
    ) -> Result<(), DomainError>
    where
        F: FnOnce() -> Result<String, DomainError>,
    {
        consume_token(&mut self.reset_password_token, supplied, now)?;
        self.password_hash = hash()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_user() -> User {
        User::new("jane", "jane@example.com", "hashed_password", None)
    }

    #[test]
    fn test_user_creation_defaults() {
        let user = create_test_user();

        assert_eq!(user.username(), "jane");
        assert_eq!(user.email(), "jane@example.com");
        assert_eq!(user.role(), Role::User);
        assert!(!user.is_verified());
        assert!(!user.is_admin());
        assert!(user.verification_token().is_none());
        assert!(user.reset_password_token().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = create_test_user();
        let b = create_test_user();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_user_id_parse() {
        let id = UserId::generate();
        assert_eq!(UserId::parse(&id.to_string()).unwrap(), id);
        assert!(UserId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_verify_email_consumes_token() {
        let mut user = create_test_user();
        let now = Utc::now();
        user.set_verification_token(OneTimeToken::new("token-1", now));

        user.verify_email("token-1", now + Duration::hours(1)).unwrap();

        assert!(user.is_verified());
        assert!(user.verification_token().is_none());
    }

    #[test]
    fn test_verify_email_wrong_token_keeps_state() {
        let mut user = create_test_user();
        let now = Utc::now();
        user.set_verification_token(OneTimeToken::new("token-1", now));

        let result = user.verify_email("token-2", now);
        assert!(matches!(result, Err(DomainError::Mismatch { .. })));
        assert!(!user.is_verified());
        assert!(user.verification_token().is_some());
    }

    #[test]
    fn test_reset_password_replaces_hash() {
        let mut user = create_test_user();
        let now = Utc::now();
        user.set_reset_password_token(OneTimeToken::new("reset-1", now));

        user.reset_password("reset-1", now, || Ok("new_hash".to_string()))
            .unwrap();

        assert_eq!(user.password_hash(), "new_hash");
        assert!(user.reset_password_token().is_none());
    }

    #[test]
    fn test_reset_password_expired() {
        let mut user = create_test_user();
        let issued = Utc::now() - Duration::hours(25);
        user.set_reset_password_token(OneTimeToken::new("reset-1", issued));

        let result = user.reset_password("reset-1", Utc::now(), || Ok("new_hash".to_string()));
        assert!(matches!(result, Err(DomainError::Expired { .. })));
        assert_eq!(user.password_hash(), "hashed_password");
    }

    #[test]
    fn test_reset_password_hashes_only_after_token_check() {
        let mut user = create_test_user();
        user.set_reset_password_token(OneTimeToken::new("reset-1", Utc::now()));

        let result = user.reset_password("wrong", Utc::now(), || {
            panic!("hash must not run for a rejected token")
        });
        assert!(matches!(result, Err(DomainError::Mismatch { .. })));
        assert!(user.reset_password_token().is_some());
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let mut user = create_test_user();
        user.set_verification_token(OneTimeToken::new("secret-token", Utc::now()));

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret-token"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
