//! Session management: login, access-token issuance and refresh

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::jwt::TokenCodec;
use crate::domain::user::{UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::user::PasswordHasher;

/// How a user identifies themselves at login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Username(String),
}

impl LoginIdentifier {
    /// Pick the identifier to use, preferring the email when both are given
    pub fn from_parts(
        email: Option<String>,
        username: Option<String>,
    ) -> Result<Self, DomainError> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        match (non_empty(email), non_empty(username)) {
            (Some(email), _) => Ok(Self::Email(email)),
            (None, Some(username)) => Ok(Self::Username(username)),
            (None, None) => Err(DomainError::validation(
                "Email or username is required",
            )),
        }
    }
}

/// Tokens handed out on a successful login
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Taken from the access token's `exp` claim
    pub access_expires_at: DateTime<Utc>,
}

/// Orchestrates credential checks and token issuance
pub struct SessionManager {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    access: Arc<dyn TokenCodec>,
    refresh: Arc<dyn TokenCodec>,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("access", &self.access)
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        access: Arc<dyn TokenCodec>,
        refresh: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            users,
            hasher,
            access,
            refresh,
        }
    }

    /// Check credentials and issue an access/refresh token pair
    pub async fn login(
        &self,
        identifier: &LoginIdentifier,
        password: &str,
    ) -> Result<SessionTokens, DomainError> {
        let user = match identifier {
            LoginIdentifier::Email(email) => self.users.find_by_email(email).await?,
            LoginIdentifier::Username(username) => self.users.find_by_username(username).await?,
        }
        .ok_or_else(|| DomainError::not_found("User not found"))?;

        if !user.is_verified() {
            warn!(user_id = %user.id(), "Login attempt on unverified account");
            return Err(DomainError::unverified(
                "User not verified. Please verify your account",
            ));
        }

        if !self.hasher.verify(password, user.password_hash()) {
            warn!(user_id = %user.id(), "Login attempt with wrong password");
            return Err(DomainError::bad_credentials("Password does not match"));
        }

        let access = self.access.issue(user.id())?;
        let refresh = self.refresh.issue(user.id())?;

        info!(user_id = %user.id(), "User logged in");

        Ok(SessionTokens {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
        })
    }

    /// Mint a new access token from a refresh token.
    ///
    /// The refresh token must verify against the refresh secret and its subject
    /// must equal `claimed`; failing either check rejects. Refresh tokens are
    /// not rotated.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        claimed: &UserId,
    ) -> Result<String, DomainError> {
        let subject = self
            .refresh
            .verify(refresh_token)
            .and_then(|claims| claims.subject());

        match subject {
            Ok(subject) if &subject == claimed => {}
            Ok(subject) => {
                warn!(token_subject = %subject, claimed = %claimed, "Refresh token subject mismatch");
                return Err(DomainError::unauthorized(
                    "Refresh token does not belong to this session",
                ));
            }
            Err(e) => {
                debug!(error = %e, "Refresh token rejected");
                return Err(e.into());
            }
        }

        let user = self
            .users
            .find_by_id(claimed)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        Ok(self.access.issue(user.id())?.token)
    }

    /// Verify a bearer access token and return its subject
    pub fn authenticate(&self, access_token: &str) -> Result<UserId, DomainError> {
        let claims = self.access.verify(access_token)?;
        Ok(claims.subject()?)
    }
}
