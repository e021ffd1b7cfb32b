//! Role and ownership checks applied inside use cases

use tracing::warn;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// Load the subject and require the `admin` role.
///
/// The role is read from the store on every call, never from the token.
pub async fn require_admin(
    users: &dyn UserRepository,
    subject: &UserId,
) -> Result<User, DomainError> {
    let user = users
        .find_by_id(subject)
        .await?
        .ok_or_else(|| DomainError::not_found("User not found"))?;

    if !user.is_admin() {
        warn!(user_id = %subject, "Admin-only operation refused");
        return Err(DomainError::unauthorized(
            "Only admin can access this resource",
        ));
    }

    Ok(user)
}

/// Require that `owner` is the authenticated subject
pub fn require_owner(owner: &UserId, subject: &UserId) -> Result<(), DomainError> {
    if owner != subject {
        warn!(owner = %owner, user_id = %subject, "Ownership check failed");
        return Err(DomainError::unauthorized(
            "User cannot access this resource",
        ));
    }
    Ok(())
}
