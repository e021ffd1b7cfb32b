//! API middleware components

pub mod auth;
pub mod logging;

pub use auth::Subject;
pub use logging::logging_middleware;
