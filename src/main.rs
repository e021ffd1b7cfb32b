use clap::Parser;
use loan_tracker::cli::{self, Cli, Command};
use loan_tracker::infrastructure::user::{Argon2Hasher, PasswordHasher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve::run().await,
        Command::HashPassword { plaintext } => {
            println!("{}", Argon2Hasher::new().hash(&plaintext)?);
            Ok(())
        }
    }
}
