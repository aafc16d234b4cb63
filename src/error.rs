//! Error taxonomy for the analyzer.
//!
//! Every fallible domain operation returns [`AppError`]. The binary edge
//! wraps these in `anyhow` for reporting; the HTTP layer maps them to
//! status codes.

use thiserror::Error;

/// Errors raised while loading data, analyzing products or talking to
/// external services.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing credential, missing data file or unreadable config.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Data file exists but its contents are unusable.
    #[error("malformed data in {source_name}: {message}")]
    MalformedData {
        source_name: String,
        message: String,
    },

    /// Caller supplied an unusable argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unknown product id.
    #[error("Product with ID {0} not found.")]
    NotFound(String),

    /// Chart rendering or remote agent failure.
    #[error("external service error: {0}")]
    ExternalService(String),
}

impl AppError {
    /// Shorthand for a malformed-data error.
    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::MalformedData {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::ExternalService(format!("request timed out: {}", e))
        } else if e.is_connect() {
            AppError::ExternalService(format!("cannot connect to agent service: {}", e))
        } else {
            AppError::ExternalService(e.to_string())
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AppError::NotFound("HT-9999".to_string());
        assert_eq!(err.to_string(), "Product with ID HT-9999 not found.");
    }

    #[test]
    fn test_malformed_message() {
        let err = AppError::malformed("products.json", "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "malformed data in products.json: expected value at line 1"
        );
    }
}
