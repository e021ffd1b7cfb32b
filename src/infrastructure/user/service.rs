//! User service: registration, email verification, profile and password reset

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::email::EmailSender;
use crate::domain::user::{
    validate_email, validate_password, validate_username, User, UserId, UserRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::auth::{
    require_owner, LoginIdentifier, OneTimeTokenIssuer, SessionManager, SessionTokens,
};

use super::password::PasswordHasher;

/// Request for registering a new account
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub contact: Option<String>,
}

/// User service for account workflows
#[derive(Debug)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: OneTimeTokenIssuer,
    email: Arc<dyn EmailSender>,
    sessions: Arc<SessionManager>,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        email: Arc<dyn EmailSender>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            repository,
            hasher,
            issuer: OneTimeTokenIssuer::new(),
            email,
            sessions,
        }
    }

    /// Register a new, unverified account and send its verification email
    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        if request.username.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(DomainError::validation(
                "Username, email and password are required",
            ));
        }

        validate_username(&request.username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password)
            .map_err(|e| DomainError::invalid_password_format(e.to_string()))?;

        if let Some(existing) = self.repository.find_by_email(&request.email).await? {
            let hint = if existing.is_verified() {
                "Try with another email"
            } else {
                "Verify your account"
            };
            return Err(DomainError::conflict(format!("User already exists: {}", hint)));
        }

        if self
            .repository
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let contact = request.contact.filter(|c| !c.trim().is_empty());

        let mut user = User::new(&request.username, &request.email, password_hash, contact);
        let token = self.issuer.issue(Utc::now());

        self.email
            .send_verification_email(user.email(), token.value())
            .await?;

        user.set_verification_token(token);
        let user = self.repository.insert(user).await?;

        info!(user_id = %user.id(), "User registered");
        Ok(user)
    }

    /// Consume the verification token sent to `email`
    pub async fn verify_email(&self, email: &str, token: &str) -> Result<User, DomainError> {
        let mut user = self.find_by_email(email).await?;

        user.verify_email(token, Utc::now()).inspect_err(|e| {
            warn!(user_id = %user.id(), error = %e, "Email verification rejected");
        })?;

        let user = self.repository.update(&user).await?;

        info!(user_id = %user.id(), "Email verified");
        Ok(user)
    }

    /// Log in with an email or username
    pub async fn login(
        &self,
        identifier: &LoginIdentifier,
        password: &str,
    ) -> Result<SessionTokens, DomainError> {
        self.sessions.login(identifier, password).await
    }

    /// Mint a new access token for `subject`
    pub async fn refresh_token(
        &self,
        subject: &UserId,
        refresh_token: &str,
    ) -> Result<String, DomainError> {
        self.sessions.refresh(refresh_token, subject).await
    }

    /// Profile of the authenticated subject
    pub async fn profile(&self, subject: &UserId) -> Result<User, DomainError> {
        self.repository
            .find_by_id(subject)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    /// Issue a reset token for the subject's own account and email it
    pub async fn request_password_reset(
        &self,
        subject: &UserId,
        email: &str,
    ) -> Result<(), DomainError> {
        let mut user = self.find_by_email(email).await?;
        require_owner(user.id(), subject)?;

        let token = self.issuer.issue(Utc::now());
        self.email.send_reset_email(user.email(), token.value()).await?;

        user.set_reset_password_token(token);
        self.repository.update(&user).await?;

        info!(user_id = %user.id(), "Password reset requested");
        Ok(())
    }

    /// Consume a reset token and install a new password
    pub async fn reset_password(
        &self,
        subject: &UserId,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        validate_password(new_password)
            .map_err(|e| DomainError::invalid_password_format(e.to_string()))?;

        let mut user = self.find_by_email(email).await?;
        require_owner(user.id(), subject)?;

        user.reset_password(token, Utc::now(), || self.hasher.hash(new_password))
            .inspect_err(|e| {
                warn!(user_id = %user.id(), error = %e, "Password reset rejected");
            })?;

        self.repository.update(&user).await?;

        info!(user_id = %user.id(), "Password updated");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User, DomainError> {
        debug!(email = %email, "Looking up user by email");
        self.repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }
}
