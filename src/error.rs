// src/error.rs

//! Unified error handling for the feed filter.

use std::fmt;

use thiserror::Error;

/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failed
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A rule could not be built from its configuration
    #[error("Rule '{kind}' in feed '{feed}': {message}")]
    Rule {
        feed: String,
        kind: String,
        message: String,
    },

    /// Feed retrieval failed
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Feed document could not be parsed
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// A record field referenced by a rule is unusable
    #[error("Field '{field}': {message}")]
    Field { field: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a rule configuration error.
    pub fn rule(
        feed: impl Into<String>,
        kind: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Rule {
            feed: feed.into(),
            kind: kind.into(),
            message: message.to_string(),
        }
    }

    /// Create a fetch error with the offending URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error with context.
    pub fn parse(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a field error.
    pub fn field(field: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Field {
            field: field.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error invalidates the whole run rather than one feed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Validation(_) | Self::Rule { .. } | Self::Yaml(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_error_names_feed_and_kind() {
        let err = AppError::rule("More or Less", "shorter_than", "bad unit");
        let msg = err.to_string();
        assert!(msg.contains("More or Less"));
        assert!(msg.contains("shorter_than"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_feed_scoped_errors_are_not_configuration() {
        assert!(!AppError::fetch("https://example.com", "timeout").is_configuration());
        assert!(!AppError::parse("feed", "unexpected eof").is_configuration());
        assert!(!AppError::field("duration", "not a number").is_configuration());
    }
}
