//! Range validation errors.

use thiserror::Error;

use super::types::RangeEcho;

/// Errors that can occur while validating a report range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// A bound is not a valid `YYYY-MM-DD` date.
    #[error("Malformed date: expected YYYY-MM-DD")]
    MalformedDate,

    /// A bound is not a valid `HH:MM` time of day.
    #[error("Malformed time: expected HH:MM")]
    MalformedTime,

    /// The begin bound is after the end bound.
    #[error("Inverted range: begin {begin} is after end {end}")]
    InvertedRange {
        /// Begin bound as supplied.
        begin: String,
        /// End bound as supplied.
        end: String,
    },

    /// The range covers more days than the report allows.
    #[error("Range spans {days} days, the maximum is {max}")]
    SpanTooLarge {
        /// Days between begin and end.
        days: i64,
        /// Maximum allowed span.
        max: i64,
    },
}

impl RangeError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedDate => "MALFORMED_DATE",
            Self::MalformedTime => "MALFORMED_TIME",
            Self::InvertedRange { .. } => "INVERTED_RANGE",
            Self::SpanTooLarge { .. } => "SPAN_TOO_LARGE",
        }
    }

    /// Returns the message shown to the person requesting the report.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MalformedDate => "The date format is invalid!",
            Self::MalformedTime => "The time format is invalid!",
            Self::InvertedRange { .. } => "The begin date cannot be later than the end date!",
            Self::SpanTooLarge { .. } => "Cannot report on more than one month of data!",
        }
    }
}

/// A rejected range, together with the bounds to echo back instead of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRejection {
    /// Why the range was rejected.
    pub error: RangeError,
    /// Best-effort bounds to show the caller.
    pub echo: RangeEcho,
}
