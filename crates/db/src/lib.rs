//! Database layer for the declaration store.
//!
//! This crate provides:
//! - Named-parameter binding and statement execution
//! - Typed decoding of report rows
//! - The report repository running every report kind against both families

pub mod executor;
pub mod records;
pub mod repositories;

pub use executor::{ExecutorError, ReportExecutor};
pub use repositories::ReportRepository;

use std::time::Duration;

use declstat_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes the connection pool.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(config.sqlx_logging);
    Database::connect(options).await
}
