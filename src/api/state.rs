//! Application state for shared services

use std::sync::Arc;

use crate::domain::email::EmailSender;
use crate::domain::loan::LoanRepository;
use crate::domain::user::UserRepository;
use crate::infrastructure::admin::AdminService;
use crate::infrastructure::auth::{SessionManager, TokenCodec};
use crate::infrastructure::loan::LoanService;
use crate::infrastructure::user::{PasswordHasher, UserService};

/// Application state shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub user_service: Arc<UserService>,
    pub loan_service: Arc<LoanService>,
    pub admin_service: Arc<AdminService>,
    /// Used by the readiness probe
    pub user_store: Arc<dyn UserRepository>,
}

/// Collaborators the state is assembled from
pub struct AppComponents {
    pub users: Arc<dyn UserRepository>,
    pub loans: Arc<dyn LoanRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub email: Arc<dyn EmailSender>,
    pub access_tokens: Arc<dyn TokenCodec>,
    pub refresh_tokens: Arc<dyn TokenCodec>,
}

impl AppState {
    /// Wire the services over the given collaborators
    pub fn new(components: AppComponents) -> Self {
        let AppComponents {
            users,
            loans,
            hasher,
            email,
            access_tokens,
            refresh_tokens,
        } = components;

        let sessions = Arc::new(SessionManager::new(
            users.clone(),
            hasher.clone(),
            access_tokens,
            refresh_tokens,
        ));

        Self {
            user_service: Arc::new(UserService::new(
                users.clone(),
                hasher,
                email,
                sessions.clone(),
            )),
            loan_service: Arc::new(LoanService::new(loans, users.clone())),
            admin_service: Arc::new(AdminService::new(users.clone())),
            sessions,
            user_store: users,
        }
    }
}
