//! The normalized result of one logical call.
//!
//! [`Outcome::result`] is the success/failure union: `Ok` carries the decoded
//! [`ResponseBody`], `Err` carries a [`Failure`]. Both variants travel with
//! the [`RawResponseMeta`] of the last attempt, real or synthetic.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::clients::http_response::{RawResponseMeta, ResponseBody};

/// Discriminant of a [`Failure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The server answered outside 200-399.
    StatusCode,
    /// A success status whose body was not valid JSON.
    NonJsonBody,
    /// The per-attempt timeout fired.
    Timeout,
    /// The caller's cancellation handle fired.
    Aborted,
    /// Any other transport-level failure.
    NetworkUnknown,
}

impl FailureKind {
    /// Returns the kebab-case name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StatusCode => "status-code",
            Self::NonJsonBody => "non-json-body",
            Self::Timeout => "timeout",
            Self::Aborted => "aborted",
            Self::NetworkUnknown => "network-unknown",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error body as received from the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorBody {
    /// Parsed from a JSON-family media type.
    Json(Value),
    /// Raw text for every other media type.
    Text(String),
}

impl ErrorBody {
    /// Returns the parsed JSON, if this body was JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns the raw text, if this body was not JSON.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A failed call.
///
/// Which fields are populated depends on [`Failure::kind`]:
///
/// | kind | `status_code` | `body` | `message` |
/// |---|---|---|---|
/// | `StatusCode` | yes | if non-empty | no |
/// | `NonJsonBody` | yes | raw text | no |
/// | `Timeout` | no | no | no |
/// | `Aborted` | no | no | cancellation reason |
/// | `NetworkUnknown` | no | no | transport error |
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}{}", describe(.status_code, .message))]
pub struct Failure {
    /// The failure discriminant.
    pub kind: FailureKind,
    /// HTTP status, for `StatusCode` and `NonJsonBody`.
    pub status_code: Option<u16>,
    /// Decoded error body, for `StatusCode` and `NonJsonBody`.
    pub body: Option<ErrorBody>,
    /// Human-readable detail, for `Aborted` and `NetworkUnknown`.
    pub message: Option<String>,
}

#[allow(clippy::ref_option)]
fn describe(status_code: &Option<u16>, message: &Option<String>) -> String {
    match (status_code, message) {
        (Some(status), _) => format!(" (status {status})"),
        (None, Some(message)) => format!(": {message}"),
        (None, None) => String::new(),
    }
}

impl Failure {
    /// A response outside 200-399.
    #[must_use]
    pub const fn status_code(status: u16, body: Option<ErrorBody>) -> Self {
        Self {
            kind: FailureKind::StatusCode,
            status_code: Some(status),
            body,
            message: None,
        }
    }

    /// A success status with an unparsable JSON body.
    #[must_use]
    pub fn non_json_body(status: u16, raw_body: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::NonJsonBody,
            status_code: Some(status),
            body: Some(ErrorBody::Text(raw_body.into())),
            message: None,
        }
    }

    /// The per-attempt timeout fired.
    #[must_use]
    pub const fn timeout() -> Self {
        Self {
            kind: FailureKind::Timeout,
            status_code: None,
            body: None,
            message: None,
        }
    }

    /// The caller cancelled the call.
    #[must_use]
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Aborted,
            status_code: None,
            body: None,
            message: Some(reason.into()),
        }
    }

    /// A transport failure that is neither a timeout nor a cancellation.
    #[must_use]
    pub fn network_unknown(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::NetworkUnknown,
            status_code: None,
            body: None,
            message: Some(message.into()),
        }
    }
}

/// The result of [`Fetcher::fetch`](crate::clients::Fetcher::fetch).
#[derive(Debug)]
pub struct Outcome {
    /// `Ok` on success, `Err` on failure.
    pub result: Result<ResponseBody, Failure>,
    /// Metadata of the last attempt's response.
    pub raw_response: RawResponseMeta,
}

impl Outcome {
    /// Wraps a decoded body.
    #[must_use]
    pub const fn success(body: ResponseBody, raw_response: RawResponseMeta) -> Self {
        Self {
            result: Ok(body),
            raw_response,
        }
    }

    /// Wraps a failure.
    #[must_use]
    pub const fn failure(failure: Failure, raw_response: RawResponseMeta) -> Self {
        Self {
            result: Err(failure),
            raw_response,
        }
    }

    /// Returns `true` if the call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn failure_ref(&self) -> Option<&Failure> {
        match &self.result {
            Ok(_) => None,
            Err(failure) => Some(failure),
        }
    }

    /// Returns the status of the last attempt (synthetic for transport failures).
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.raw_response.status
    }

    /// Splits the outcome into its result and metadata.
    #[must_use]
    pub fn into_parts(self) -> (Result<ResponseBody, Failure>, RawResponseMeta) {
        (self.result, self.raw_response)
    }
}
