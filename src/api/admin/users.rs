//! User management admin endpoints

use axum::extract::{rejection::QueryRejection, Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::Subject;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse};
use crate::api::users::query_error;
use crate::domain::user::{PageRequest, Role, User, UserId};

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page_no: Option<u64>,
    pub page_size: Option<u64>,
}

impl ListUsersQuery {
    fn page(&self) -> PageRequest {
        PageRequest::new(
            self.page_no.unwrap_or(1),
            self.page_size.unwrap_or(PageRequest::DEFAULT_PAGE_SIZE),
        )
    }
}

/// User as listed to admins
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub is_verified: bool,
    pub role: Role,
    pub created_at: String,
}

impl From<&User> for AdminUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            contact: user.contact().map(String::from),
            is_verified: user.is_verified(),
            role: user.role(),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<AdminUserResponse>,
    pub page_no: u64,
    pub page_size: u64,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub deleted: bool,
}

/// GET /admin/users?page_no=&page_size=
pub async fn list_users(
    State(state): State<AppState>,
    Subject(subject): Subject,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<ApiResponse<UserListResponse>, ApiError> {
    let Query(query) = query.map_err(query_error)?;
    let page = query.page();
    debug!(page_no = page.page_no, page_size = page.page_size, "Listing users");

    let result = state.admin_service.list_users(&subject, page).await?;

    Ok(ApiResponse::ok(
        "Users",
        UserListResponse {
            users: result.users.iter().map(AdminUserResponse::from).collect(),
            page_no: result.page_no,
            page_size: result.page_size,
            total: result.total,
        },
    ))
}

/// DELETE /admin/users/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    Subject(subject): Subject,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<DeleteUserResponse>, ApiError> {
    let user_id = UserId::parse(&user_id)?;

    state.admin_service.delete_user(&subject, &user_id).await?;

    Ok(ApiResponse::ok(
        "User deleted",
        DeleteUserResponse { deleted: true },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = ListUsersQuery::default().page();
        assert_eq!(page.page_no, 1);
        assert_eq!(page.page_size, 10);
    }

    #[test]
    fn test_page_is_clamped() {
        let page = ListUsersQuery {
            page_no: Some(0),
            page_size: Some(10_000),
        }
        .page();

        assert_eq!(page.page_no, 1);
        assert_eq!(page.page_size, PageRequest::MAX_PAGE_SIZE);
    }
}
