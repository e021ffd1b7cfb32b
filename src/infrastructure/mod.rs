//! Infrastructure layer - Store adapters, token handling and use-case services

pub mod admin;
pub mod auth;
pub mod email;
pub mod loan;
pub mod logging;
pub mod storage;
pub mod user;
