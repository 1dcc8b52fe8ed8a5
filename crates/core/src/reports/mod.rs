//! Customs declaration report construction.
//!
//! This module provides pure logic for the declaration statistics reports:
//! - Daily inbound/outbound volume with valuation
//! - Release rate summary
//! - Status distribution
//! - Intraday test traffic volume
//! - Grouped export by customs office and declaring entity

pub mod builder;
pub mod error;
pub mod status;
pub mod templates;
pub mod types;


pub use builder::{QuerySpec, ReportQueryBuilder};
pub use error::ReportError;
pub use status::{StatusCategory, StatusSelector, StatusStage};
pub use types::*;
