//! API layer - HTTP endpoints and middleware

pub mod admin;
pub mod health;
pub mod loans;
pub mod middleware;
pub mod router;
pub mod state;
pub mod token;
pub mod types;
pub mod users;

#[cfg(test)]
mod tests;

pub use router::create_router_with_state;
pub use state::{AppComponents, AppState};
