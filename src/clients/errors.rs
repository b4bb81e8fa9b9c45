//! Request validation errors.
//!
//! Ordinary HTTP and transport failures are not errors here: the executor
//! reports them as a [`Failure`](crate::clients::Failure) inside an
//! [`Outcome`](crate::clients::Outcome). The error below is reserved for
//! requests that are malformed before any I/O happens.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use taskmaster_sdk::clients::{HttpMethod, InvalidRequestError, RequestSpec};
//!
//! let result = RequestSpec::builder(HttpMethod::Get, "http://127.0.0.1:8000/api/health")
//!     .json(json!({"unexpected": true}))
//!     .build();
//!
//! assert!(matches!(result, Err(InvalidRequestError::BodyNotAllowed { .. })));
//! ```

use thiserror::Error;

/// Error returned when a [`RequestSpec`](crate::clients::RequestSpec) fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidRequestError {
    /// The target URL is not an absolute URL.
    #[error("Invalid request URL '{url}'.")]
    InvalidUrl {
        /// The URL that was provided.
        url: String,
    },

    /// A body was provided for a method that does not carry one.
    #[error("Cannot send a body with {method} requests.")]
    BodyNotAllowed {
        /// The HTTP method of the request.
        method: String,
    },

    /// A header name cannot be sent over HTTP.
    #[error("Invalid header name '{name}'.")]
    InvalidHeaderName {
        /// The offending header name.
        name: String,
    },

    /// A literal header value cannot be sent over HTTP.
    #[error("Invalid value for header '{name}'.")]
    InvalidHeaderValue {
        /// The header whose value was rejected.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_not_allowed_message() {
        let error = InvalidRequestError::BodyNotAllowed {
            method: "GET".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot send a body with GET requests.");
    }

    #[test]
    fn test_invalid_url_message() {
        let error = InvalidRequestError::InvalidUrl {
            url: "/relative".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid request URL '/relative'.");
    }

    #[test]
    fn test_error_implements_std_error() {
        let error: &dyn std::error::Error = &InvalidRequestError::InvalidHeaderName {
            name: "bad name".to_string(),
        };
        let _ = error;
    }
}
