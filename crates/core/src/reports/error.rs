//! Report error types.

use thiserror::Error;

use crate::window::RangeError;

/// Errors that can occur while preparing or running a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// The requested range was rejected.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// A customs office code failed the allow-list check.
    #[error("Invalid customs office code: {0}")]
    InvalidOfficeCode(String),

    /// The query executor failed. The cause is carried verbatim and not interpreted.
    #[error("Query execution failed: {0}")]
    QueryExecution(String),
}

impl ReportError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Range(err) => err.error_code(),
            Self::InvalidOfficeCode(_) => "INVALID_OFFICE_CODE",
            Self::QueryExecution(_) => "QUERY_EXECUTION_ERROR",
        }
    }

    /// Returns the message shown to the person requesting the report.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Range(err) => err.message(),
            Self::InvalidOfficeCode(_) => "Customs office codes may only contain letters and digits!",
            Self::QueryExecution(_) => "The statistics could not be loaded, please try again later.",
        }
    }
}
