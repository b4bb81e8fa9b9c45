//! Response metadata and body decoding.
//!
//! This module provides [`RawResponseMeta`], the status and headers of the
//! last attempt, and [`ResponseBody`], the decoded payload of a successful
//! call. It also holds the content-type rules used to decode error bodies.

use std::collections::HashMap;

use serde_json::Value;

use crate::clients::outcome::ErrorBody;

/// Status reported for attempts ended by a timeout or a cancellation.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Coarse origin of a [`RawResponseMeta`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseKind {
    /// Built from a real server response.
    #[default]
    Basic,
    /// Synthesized after a transport failure.
    Error,
}

/// Status line and headers of the last attempt.
///
/// Header names are lower-cased; a header may carry several values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponseMeta {
    /// Response headers.
    pub headers: HashMap<String, Vec<String>>,
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase.
    pub status_text: String,
    /// `true` if the final URL differs from the requested URL.
    pub redirected: bool,
    /// Final response URL.
    pub url: String,
    /// Whether the response is real or synthetic.
    pub kind: ResponseKind,
}

impl RawResponseMeta {
    /// Captures the metadata of a live response.
    #[must_use]
    pub fn from_response(response: &reqwest::Response, request_url: &reqwest::Url) -> Self {
        let status = response.status();
        Self {
            headers: parse_response_headers(response.headers()),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            redirected: response.url() != request_url,
            url: response.url().to_string(),
            kind: ResponseKind::Basic,
        }
    }

    /// Synthetic metadata for an attempt ended by a timeout or cancellation.
    #[must_use]
    pub fn aborted() -> Self {
        Self {
            status: CLIENT_CLOSED_REQUEST,
            status_text: "Client Closed Request".to_string(),
            kind: ResponseKind::Error,
            ..Self::default()
        }
    }

    /// Synthetic metadata for any other transport failure.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            status: 0,
            status_text: "Unknown Error".to_string(),
            kind: ResponseKind::Error,
            ..Self::default()
        }
    }

    /// Returns the first value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `Content-Type` header, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns `true` if the status is in the 200-399 range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status <= 399
    }
}

fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in headers {
        let key = name.as_str().to_lowercase();
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        result.entry(key).or_default().push(value);
    }
    result
}

/// A lazily read response body.
///
/// Nothing is buffered until one of the reading methods is called.
#[derive(Debug)]
pub struct BinaryResponse {
    inner: reqwest::Response,
}

impl BinaryResponse {
    pub(crate) const fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Returns the `Content-Length` advertised by the server, if any.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length()
    }

    /// Reads the next chunk, or `None` once the body is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the connection fails mid-body.
    pub async fn chunk(&mut self) -> Result<Option<Vec<u8>>, reqwest::Error> {
        Ok(self.inner.chunk().await?.map(|bytes| bytes.to_vec()))
    }

    /// Reads the remaining body into memory.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the connection fails mid-body.
    pub async fn bytes(self) -> Result<Vec<u8>, reqwest::Error> {
        Ok(self.inner.bytes().await?.to_vec())
    }

    /// Reads the remaining body as text.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the connection fails mid-body.
    pub async fn text(self) -> Result<String, reqwest::Error> {
        self.inner.text().await
    }

    /// Returns the underlying response.
    #[must_use]
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}

/// The decoded body of a successful call.
#[derive(Debug)]
pub enum ResponseBody {
    /// Parsed JSON.
    Json(Value),
    /// Decoded text.
    Text(String),
    /// A handle over the unread body.
    Binary(BinaryResponse),
    /// No body (empty payload, or a 204/205/304 status).
    Empty,
}

impl ResponseBody {
    /// Returns the JSON value, if any.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the text, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Consumes the body, returning the JSON value if any.
    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the body, returning the binary handle if any.
    #[must_use]
    pub fn into_binary(self) -> Option<BinaryResponse> {
        match self {
            Self::Binary(binary) => Some(binary),
            _ => None,
        }
    }

    /// Returns `true` for [`ResponseBody::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Returns `true` for statuses that never carry a body.
#[must_use]
pub const fn is_null_body_status(status: u16) -> bool {
    matches!(status, 101 | 204 | 205 | 304)
}

/// Returns `true` for JSON-family media types.
///
/// Matches `application/json`, `text/json` and any `application/*+json`
/// (`problem+json`, `hal+json`, `vnd.api+json`, ...). Parameters such as
/// `charset` are ignored.
#[must_use]
pub fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        Some(("text", "json")) => true,
        _ => false,
    }
}

/// Decodes the body of an error response.
///
/// JSON-family content types are parsed, falling back to raw text when the
/// payload is malformed. Without a content type the body is parsed as JSON
/// when possible. Empty bodies yield `None`.
#[must_use]
pub fn decode_error_body(content_type: Option<&str>, text: String) -> Option<ErrorBody> {
    if text.trim().is_empty() {
        return None;
    }

    let try_json = content_type.map_or(true, is_json_media_type);
    if try_json {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return Some(ErrorBody::Json(value));
        }
    }
    Some(ErrorBody::Text(text))
}
