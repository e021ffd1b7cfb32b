//! Loan Tracker API
//!
//! Account registration with email verification, JWT sessions with refresh
//! tokens, password reset, loan applications and admin review.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppComponents, AppState};
use config::StoreBackend;
use domain::loan::LoanRepository;
use domain::user::{validate_password, Role, User, UserRepository};
use infrastructure::auth::{JwtConfig, JwtService, TokenKind};
use infrastructure::email::LogEmailSender;
use infrastructure::loan::{InMemoryLoanRepository, PostgresLoanRepository};
use infrastructure::storage::{run_migrations, OperationTimeout, PostgresConfig};
use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PasswordHasher, PostgresUserRepository,
};
use rand::Rng;
use tracing::info;

const INITIAL_ADMIN_USERNAME: &str = "admin";
const INITIAL_ADMIN_EMAIL: &str = "admin@localhost";

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    info!("Store backend: {:?}", config.store.backend);

    let (users, loans) = create_repositories(config).await?;
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

    create_initial_admin_user(users.as_ref(), hasher.as_ref()).await?;

    let access_tokens = JwtService::new(
        TokenKind::Access,
        &JwtConfig::new(
            config.auth.access_token_secret.clone(),
            config.auth.access_token_expiry_hours,
        ),
    );
    let refresh_tokens = JwtService::new(
        TokenKind::Refresh,
        &JwtConfig::new(
            config.auth.refresh_token_secret.clone(),
            config.auth.refresh_token_expiry_hours,
        ),
    );

    Ok(AppState::new(AppComponents {
        users,
        loans,
        hasher,
        email: Arc::new(LogEmailSender::new(config.server.public_url.clone())),
        access_tokens: Arc::new(access_tokens),
        refresh_tokens: Arc::new(refresh_tokens),
    }))
}

async fn create_repositories(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn UserRepository>, Arc<dyn LoanRepository>)> {
    match config.store.backend {
        StoreBackend::Memory => Ok((
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryLoanRepository::new()),
        )),
        StoreBackend::Postgres => {
            let url = config
                .store
                .database_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("store.database_url is required for postgres"))?;

            info!("Connecting to PostgreSQL...");
            let pool = PostgresConfig::new(url)
                .with_max_connections(config.store.max_connections)
                .connect()
                .await?;
            info!("PostgreSQL connection established");

            run_migrations(&pool).await?;

            let timeout = OperationTimeout::from_secs(config.store.operation_timeout_secs);

            Ok((
                Arc::new(PostgresUserRepository::new(pool.clone(), timeout)),
                Arc::new(PostgresLoanRepository::new(pool, timeout)),
            ))
        }
    }
}

/// Generate a random password for the initial admin user
fn generate_random_password() -> String {
    use rand::distributions::Alphanumeric;

    loop {
        let mut password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(15)
            .map(char::from)
            .collect();
        password.push('!');

        if validate_password(&password).is_ok() {
            return password;
        }
    }
}

/// Create an initial admin user if no users exist
async fn create_initial_admin_user(
    users: &dyn UserRepository,
    hasher: &dyn PasswordHasher,
) -> anyhow::Result<()> {
    if users.count().await? > 0 {
        return Ok(());
    }

    // Use ADMIN_DEFAULT_PASSWORD env var if set, otherwise generate random password
    let (password, is_default) = match std::env::var("ADMIN_DEFAULT_PASSWORD") {
        Ok(p) if !p.is_empty() => (p, true),
        _ => (generate_random_password(), false),
    };

    let mut admin = User::new(
        INITIAL_ADMIN_USERNAME,
        INITIAL_ADMIN_EMAIL,
        hasher.hash(&password)?,
        None,
    );
    admin.mark_verified();
    admin.set_role(Role::Admin);

    users.insert(admin).await?;

    info!("===========================================");
    info!("Initial admin user created!");
    info!("Username: {}", INITIAL_ADMIN_USERNAME);

    if is_default {
        info!("Password: (set via ADMIN_DEFAULT_PASSWORD)");
    } else {
        info!("Password: {}", password);
    }

    info!("Please change this password after first login.");
    info!("===========================================");

    Ok(())
}
