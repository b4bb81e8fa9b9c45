//! Error types for the Taskmaster SDK.
//!
//! This module contains the error type used for configuration and validation
//! errors. HTTP-level failures are not errors in this sense: the request
//! executor reports them through [`crate::clients::Outcome`].
//!
//! # Example
//!
//! ```rust
//! use taskmaster_sdk::{BaseUrl, ConfigError};
//!
//! let result = BaseUrl::new("not a url");
//! assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide an absolute URL with scheme (e.g., 'http://127.0.0.1:8000').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A default header name or value cannot be sent over HTTP.
    #[error("Invalid default header '{name}': {reason}")]
    InvalidHeader {
        /// The offending header name.
        name: String,
        /// Why the header was rejected.
        reason: String,
    },

    /// The retry policy is inconsistent.
    #[error("Invalid retry policy: {reason}")]
    InvalidRetryPolicy {
        /// The reason the policy was rejected.
        reason: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {reason}")]
    HttpClientInit {
        /// The message reported by the HTTP stack.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_error_message() {
        let error = ConfigError::InvalidBaseUrl {
            url: "nope".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("nope"));
        assert!(message.contains("absolute URL"));
    }

    #[test]
    fn test_invalid_retry_policy_error_message() {
        let error = ConfigError::InvalidRetryPolicy {
            reason: "jitter must be within [0, 1]".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid retry policy: jitter must be within [0, 1]"
        );
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::HttpClientInit {
            reason: "tls".to_string(),
        };
        let _: &dyn std::error::Error = &error;
    }
}
