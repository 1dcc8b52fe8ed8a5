//! Shared errors and configuration for Declstat.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, ExportConfig, ReportingConfig, ServerConfig};
pub use error::{AppError, AppResult};
