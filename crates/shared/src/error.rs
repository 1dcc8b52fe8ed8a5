//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Startup failures.
///
/// Report-level problems are answered in the response body and never reach
/// this type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(config::ConfigError::NotFound("database.url".into()), "database.url")]
    #[case(config::ConfigError::Message("bad port".into()), "bad port")]
    fn test_config_error_converts(#[case] source: config::ConfigError, #[case] detail: &str) {
        let err: AppError = source.into();
        assert!(matches!(&err, AppError::Configuration(message) if message.contains(detail)));
        assert!(err.to_string().starts_with("Configuration error: "));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Configuration("msg".into()).to_string(),
            "Configuration error: msg"
        );
    }
}
