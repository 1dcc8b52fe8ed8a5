//! Report range validation.
//!
//! Turns raw `beginDate`/`endDate` (or `beginTime`/`endTime`) request values
//! into a canonical [`TimeWindow`]:
//! - Sanitization of hostile characters
//! - Date (`YYYY-MM-DD`) and time-of-day (`HH:MM`) parsing
//! - Ordering and span limits
//! - Exclusive upper bound adjustment per report kind

pub mod error;
pub mod types;
pub mod validator;


pub use error::{RangeError, RangeRejection};
pub use types::{Granularity, RangeEcho, RangeOutcome, TimeWindow};
pub use validator::{DEFAULT_MAX_SPAN_DAYS, RangeValidator, sanitize};
