//! Autolinking error types

use autolink_config::ConfigError;
use thiserror::Error;

/// Autolinking error type
#[derive(Debug, Error)]
pub enum AutolinkError {
    /// The document engine could not produce a tree
    #[error("Document parse failed: {0}")]
    Parse(String),

    /// The service was built from a configuration that does not validate
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A link URL does not carry the configured internal prefix
    #[error("Not an autolink target: {0}")]
    InvalidLinkTarget(String),
}

/// Specialized Result type for autolinking operations
pub type AutolinkResult<T> = Result<T, AutolinkError>;

impl AutolinkError {
    /// Create a parse failure error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid link target error
    pub fn invalid_link_target(url: impl Into<String>) -> Self {
        Self::InvalidLinkTarget(url.into())
    }

    /// Recoverable errors only affect one note body; the caller keeps the
    /// input text and carries on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::InvalidLinkTarget(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AutolinkError::parse("unterminated fence");
        assert_eq!(err.to_string(), "Document parse failed: unterminated fence");

        let err = AutolinkError::invalid_link_target("https://example.com");
        assert_eq!(err.to_string(), "Not an autolink target: https://example.com");
    }

    #[test]
    fn test_recoverable() {
        assert!(AutolinkError::parse("x").is_recoverable());
        assert!(!AutolinkError::Config(ConfigError::invalid("x")).is_recoverable());
    }
}
