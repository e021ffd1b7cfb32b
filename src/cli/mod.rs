//! CLI module for the loan tracker
//!
//! - `serve`: run the HTTP API (default)
//! - `hash-password`: print an Argon2id hash for seeding accounts by hand

pub mod serve;

use clap::{Parser, Subcommand};

/// Loan Tracker - accounts, sessions and loan applications over HTTP
#[derive(Parser)]
#[command(name = "loan-tracker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Hash a password with the server's Argon2id settings
    HashPassword {
        /// Plaintext password
        plaintext: String,
    },
}
