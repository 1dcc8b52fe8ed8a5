//! Core report logic for Declstat.
//!
//! This crate contains pure logic with ZERO web or database dependencies.
//! Request validation, query construction and result shaping live here.
//!
//! # Modules
//!
//! - `window` - Date/time range validation and the canonical time window
//! - `reports` - Report kinds, status categories and the aggregation query builder
//! - `export` - Column plan and file naming for the grouped spreadsheet export

pub mod export;
pub mod reports;
pub mod window;
