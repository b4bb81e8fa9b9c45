//! Errors returned by the typed API client.
//!
//! The executor reports failures as values; this layer turns them into
//! [`ApiError`] so callers can use `?`.
//!
//! # Example
//!
//! ```rust,ignore
//! use taskmaster_sdk::api::ApiError;
//!
//! match client.tasks().delete_task(None).await {
//!     Ok(task) => println!("deleted {}", task.data.id),
//!     Err(ApiError::Timeout { .. }) => println!("server too slow"),
//!     Err(err) if err.status_code() == Some(404) => println!("already gone"),
//!     Err(err) => return Err(err.into()),
//! }
//! ```

use thiserror::Error;

use crate::clients::{
    ErrorBody, Failure, FailureKind, HttpMethod, InvalidRequestError, RawResponseMeta,
};

/// Error type for typed API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{}", status_message(.status_code, .body))]
    Status {
        /// HTTP status code.
        status_code: u16,
        /// Decoded error body, if any.
        body: Option<ErrorBody>,
        /// Metadata of the failed response.
        raw_response: RawResponseMeta,
    },

    /// A success status whose body was not valid JSON.
    #[error("{}", non_json_message(.status_code, .raw_body))]
    NonJson {
        /// HTTP status code.
        status_code: u16,
        /// The raw body text.
        raw_body: String,
        /// Metadata of the response.
        raw_response: RawResponseMeta,
    },

    /// The per-attempt timeout fired.
    #[error("Timeout exceeded when calling {method} {path}.")]
    Timeout {
        /// HTTP method of the call.
        method: HttpMethod,
        /// Endpoint path of the call.
        path: String,
    },

    /// The call was cancelled through its cancellation handle.
    #[error("Request to {method} {path} was aborted: {reason}")]
    Aborted {
        /// HTTP method of the call.
        method: HttpMethod,
        /// Endpoint path of the call.
        path: String,
        /// The cancellation reason.
        reason: String,
    },

    /// A transport failure.
    #[error("{message}")]
    Unknown {
        /// The transport error message.
        message: String,
        /// Synthetic response metadata.
        raw_response: RawResponseMeta,
    },

    /// The request could not be built.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),

    /// The request model could not be serialized.
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The response body did not match the expected model.
    #[error("Failed to deserialize response body: {source}")]
    Deserialize {
        /// The underlying serde error.
        source: serde_json::Error,
        /// Metadata of the response.
        raw_response: RawResponseMeta,
    },
}

/// `Status code: N` followed by a pretty-printed `Body: ...` line.
fn build_message(status_code: u16, body: Option<&ErrorBody>) -> String {
    let mut lines = vec![format!("Status code: {status_code}")];
    if let Some(body) = body {
        let rendered = match body {
            ErrorBody::Json(value) => serde_json::to_string_pretty(value),
            ErrorBody::Text(text) => serde_json::to_string(text),
        };
        lines.push(format!("Body: {}", rendered.unwrap_or_else(|_| body.to_string())));
    }
    lines.join("\n")
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn status_message(status_code: &u16, body: &Option<ErrorBody>) -> String {
    build_message(*status_code, body.as_ref())
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn non_json_message(status_code: &u16, raw_body: &str) -> String {
    build_message(*status_code, Some(&ErrorBody::Text(raw_body.to_string())))
}

impl ApiError {
    /// Converts an executor failure for the endpoint `method path`.
    #[must_use]
    pub fn from_failure(
        failure: Failure,
        raw_response: RawResponseMeta,
        method: HttpMethod,
        path: &str,
    ) -> Self {
        match failure.kind {
            FailureKind::StatusCode => Self::Status {
                status_code: failure.status_code.unwrap_or(raw_response.status),
                body: failure.body,
                raw_response,
            },
            FailureKind::NonJsonBody => Self::NonJson {
                status_code: failure.status_code.unwrap_or(raw_response.status),
                raw_body: failure.body.map(|body| body.to_string()).unwrap_or_default(),
                raw_response,
            },
            FailureKind::Timeout => Self::Timeout {
                method,
                path: path.to_string(),
            },
            FailureKind::Aborted => Self::Aborted {
                method,
                path: path.to_string(),
                reason: failure.message.unwrap_or_default(),
            },
            FailureKind::NetworkUnknown => Self::Unknown {
                message: failure.message.unwrap_or_default(),
                raw_response,
            },
        }
    }

    /// Returns the HTTP status code, for errors that carry one.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status_code, .. } | Self::NonJson { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }

    /// Returns the response metadata, for errors that carry it.
    #[must_use]
    pub const fn raw_response(&self) -> Option<&RawResponseMeta> {
        match self {
            Self::Status { raw_response, .. }
            | Self::NonJson { raw_response, .. }
            | Self::Unknown { raw_response, .. }
            | Self::Deserialize { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns `true` for [`ApiError::Timeout`].
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_message_pretty_prints_json_body() {
        let error = ApiError::Status {
            status_code: 404,
            body: Some(ErrorBody::Json(json!({"detail": "missing"}))),
            raw_response: RawResponseMeta::default(),
        };
        assert_eq!(
            error.to_string(),
            "Status code: 404\nBody: {\n  \"detail\": \"missing\"\n}"
        );
    }

    #[test]
    fn test_status_message_quotes_text_body() {
        let error = ApiError::Status {
            status_code: 502,
            body: Some(ErrorBody::Text("Bad Gateway".to_string())),
            raw_response: RawResponseMeta::default(),
        };
        assert_eq!(error.to_string(), "Status code: 502\nBody: \"Bad Gateway\"");
    }

    #[test]
    fn test_status_message_without_body() {
        let error = ApiError::Status {
            status_code: 500,
            body: None,
            raw_response: RawResponseMeta::default(),
        };
        assert_eq!(error.to_string(), "Status code: 500");
    }

    #[test]
    fn test_timeout_message_names_endpoint() {
        let error = ApiError::from_failure(
            Failure::timeout(),
            RawResponseMeta::aborted(),
            HttpMethod::Post,
            "/api/create-task",
        );
        assert!(error.is_timeout());
        assert_eq!(
            error.to_string(),
            "Timeout exceeded when calling POST /api/create-task."
        );
    }

    #[test]
    fn test_from_failure_maps_every_kind() {
        let status = ApiError::from_failure(
            Failure::status_code(409, None),
            RawResponseMeta::default(),
            HttpMethod::Put,
            "/api/update-task",
        );
        assert_eq!(status.status_code(), Some(409));

        let non_json = ApiError::from_failure(
            Failure::non_json_body(200, "<html>"),
            RawResponseMeta::default(),
            HttpMethod::Get,
            "/api/health",
        );
        assert!(matches!(&non_json, ApiError::NonJson { raw_body, .. } if raw_body == "<html>"));

        let aborted = ApiError::from_failure(
            Failure::aborted("user left"),
            RawResponseMeta::aborted(),
            HttpMethod::Delete,
            "/api/delete-task",
        );
        assert!(matches!(&aborted, ApiError::Aborted { reason, .. } if reason == "user left"));
        assert!(aborted.raw_response().is_none());

        let unknown = ApiError::from_failure(
            Failure::network_unknown("connection refused"),
            RawResponseMeta::unknown(),
            HttpMethod::Get,
            "/api/health",
        );
        assert_eq!(unknown.to_string(), "connection refused");
        assert_eq!(unknown.raw_response().map(|meta| meta.status), Some(0));
    }
}
