//! Storage infrastructure - PostgreSQL pool, schema and operation bounds

pub mod migrations;
mod postgres;

pub use migrations::{run_migrations, Migration, PostgresMigrator};
pub(crate) use postgres::{read_error, write_error};
pub use postgres::{OperationTimeout, PostgresConfig};
