//! Error handling for emoji-domain

use std::time::Duration;
use thiserror::Error;

/// Main error type for emoji-domain
#[derive(Error, Debug, Clone)]
pub enum EmojiDomainError {
    #[error("Overflow while transcoding: {context}")]
    Overflow { context: String },

    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        position: Option<usize>,
    },

    #[error("Cannot convert label '{label}': {source}")]
    Ace {
        label: String,
        #[source]
        source: Box<EmojiDomainError>,
    },

    #[error("{subject} is {octets} octets long (max {limit})")]
    Length {
        subject: String,
        octets: usize,
        limit: usize,
    },

    #[error("Batch of {count} domains is outside 1..={max}")]
    Size { count: usize, max: usize },

    #[error("Network error: {message}")]
    Network {
        message: String,
        server: Option<String>,
    },

    #[error("Timeout error: {operation} timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EmojiDomainError {
    /// Create an overflow error
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::Overflow {
            context: context.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>, position: Option<usize>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            position,
        }
    }

    /// Wrap a codec error with the label it was raised for
    pub fn ace(label: impl Into<String>, source: EmojiDomainError) -> Self {
        Self::Ace {
            label: label.into(),
            source: Box::new(source),
        }
    }

    /// Create a length error
    pub fn length(subject: impl Into<String>, octets: usize, limit: usize) -> Self {
        Self::Length {
            subject: subject.into(),
            octets,
            limit,
        }
    }

    /// Create a batch size error
    pub fn size(count: usize, max: usize) -> Self {
        Self::Size { count, max }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>, server: Option<String>) -> Self {
        Self::Network {
            message: message.into(),
            server,
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for errors raised by the Bootstring codec or the label framing
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            Self::Overflow { .. } | Self::InvalidInput { .. } | Self::Ace { .. } | Self::Length { .. }
        )
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Overflow { context } => {
                format!("❌ Integer overflow: {}\n💡 The input is too long to encode", context)
            }
            Self::InvalidInput { message, position } => {
                let at = position.map_or(String::new(), |p| format!(" (at offset {})", p));
                format!("❌ Invalid input{}: {}", at, message)
            }
            Self::Ace { label, source } => {
                format!("❌ Label '{}' cannot be converted: {}", label, source)
            }
            Self::Length { subject, octets, limit } => {
                format!("❌ {} is too long: {} octets (max {})\n💡 Use fewer or shorter labels", subject, octets, limit)
            }
            Self::Size { count, max } => {
                format!("❌ Got {} domains, expected between 1 and {}", count, max)
            }
            Self::Network { message, server } => {
                let at = server.as_ref().map_or(String::new(), |s| format!(" ({})", s));
                format!("❌ Network error{}: {}\n💡 Check your internet connection", at, message)
            }
            Self::Timeout { operation, timeout } => {
                format!("⏱️  Operation '{}' timed out after {:?}\n💡 Try increasing --timeout", operation, timeout)
            }
            Self::Config { message } => {
                format!("❌ Configuration problem: {}\n💡 Check your .env file or environment", message)
            }
            Self::Internal { message } => {
                format!("❌ Internal error: {}\n💡 This is a bug, please report it", message)
            }
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, EmojiDomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ace_error_keeps_source() {
        let err = EmojiDomainError::ace("xn--99999999", EmojiDomainError::overflow("decode"));
        assert!(err.to_string().contains("xn--99999999"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.is_codec_error());
    }

    #[test]
    fn test_user_message_mentions_limits() {
        let err = EmojiDomainError::size(51, 50);
        assert!(err.user_message().contains("51"));
        assert!(!err.is_codec_error());

        let err = EmojiDomainError::length("Label 'abc'", 64, 63);
        assert!(err.to_string().contains("64 octets"));
    }

    #[test]
    fn test_timeout_keeps_sub_second_precision() {
        let err = EmojiDomainError::timeout("DNS lookup", Duration::from_millis(250));
        assert_eq!(err.to_string(), "Timeout error: DNS lookup timed out after 250ms");
        assert!(err.user_message().contains("250ms"));
    }
}
