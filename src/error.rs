// src/error.rs

//! Unified error handling for schedule normalization.

use std::fmt;

use thiserror::Error;

/// Result type alias for schedule operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Adapter schema names a column outside the known vocabulary
    #[error("Unknown column type '{0}'")]
    UnknownColumn(String),

    /// Page structure could not be interpreted
    #[error("Unparseable structure in {context}: {message}")]
    Structure { context: String, message: String },

    /// Source rejected the supplied credentials
    #[error("Authentication failed: {0}")]
    Credentials(String),

    /// Every page of a multi-page schedule failed
    #[error("All {count} page(s) failed, last error: {last}")]
    AllPagesFailed { count: usize, last: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[cfg(feature = "fetch")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configured regular expression is invalid
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a structure error with context.
    pub fn structure(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Structure {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an authentication error.
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials(message.into())
    }

    /// Whether this error means "login failed" rather than "no data".
    pub fn is_credentials(&self) -> bool {
        matches!(self, Self::Credentials(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_message() {
        let err = AppError::structure("page 2", "missing header date");
        assert_eq!(
            err.to_string(),
            "Unparseable structure in page 2: missing header date"
        );
    }

    #[test]
    fn test_is_credentials() {
        assert!(AppError::credentials("wrong password").is_credentials());
        assert!(!AppError::UnknownColumn("foo".into()).is_credentials());
    }
}
