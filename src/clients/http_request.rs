//! Request description types for the request executor.
//!
//! A [`RequestSpec`] describes one logical call. It is built once with
//! [`RequestSpec::builder`] and only borrowed by the executor, so every retry
//! reuses the same URL and body. Headers are re-resolved per attempt.

use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::clients::errors::InvalidRequestError;
use crate::clients::headers::{HeaderValue, Headers};
use crate::clients::signals::CancellationHandle;
use crate::url::ArrayFormat;

/// HTTP methods supported by the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the method token as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a successful response body should be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseType {
    /// Parse as JSON; a parse failure becomes a `NonJsonBody` failure.
    #[default]
    Json,
    /// Decode as text.
    Text,
    /// Hand back a lazily-read [`BinaryResponse`](crate::clients::BinaryResponse).
    Binary,
    /// Same as [`ResponseType::Binary`], for chunked consumption.
    Stream,
}

/// One part of a multipart form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MultipartPart {
    /// A plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A file field.
    File {
        /// Field name.
        name: String,
        /// File contents.
        data: Vec<u8>,
        /// File name reported to the server.
        file_name: Option<String>,
    },
}

/// A `multipart/form-data` body description.
///
/// The form is kept as plain data and converted to a fresh
/// [`reqwest::multipart::Form`] on every attempt, since a sent form is consumed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<MultipartPart>,
}

impl MultipartForm {
    /// Creates an empty form.
    #[must_use]
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Adds a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds a file field.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        data: impl Into<Vec<u8>>,
        file_name: Option<String>,
    ) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            data: data.into(),
            file_name,
        });
        self
    }

    /// Returns the parts in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    pub(crate) fn to_form(&self) -> reqwest::multipart::Form {
        self.parts
            .iter()
            .fold(reqwest::multipart::Form::new(), |form, part| match part {
                MultipartPart::Text { name, value } => form.text(name.clone(), value.clone()),
                MultipartPart::File {
                    name,
                    data,
                    file_name,
                } => {
                    let mut file = reqwest::multipart::Part::bytes(data.clone());
                    if let Some(file_name) = file_name {
                        file = file.file_name(file_name.clone());
                    }
                    form.part(name.clone(), file)
                }
            })
    }
}

/// A request body together with its encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// UTF-8 JSON text, sent with `Content-Type: application/json`.
    Json(Value),
    /// Raw bytes with an optional content type.
    Bytes {
        /// The payload.
        data: Vec<u8>,
        /// Value for the `Content-Type` header, if any.
        content_type: Option<String>,
    },
    /// A `multipart/form-data` body; the boundary header is set by the transport.
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Returns the `Content-Type` implied by the body encoding, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Json(_) => Some("application/json"),
            Self::Bytes { content_type, .. } => content_type.as_deref(),
            Self::Multipart(_) => None,
        }
    }

    /// Returns the headers derived from the body encoding.
    #[must_use]
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.set("Content-Type", self.content_type().map(HeaderValue::from));
        headers
    }
}

/// An immutable description of one logical HTTP call.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use serde_json::json;
/// use taskmaster_sdk::clients::{HttpMethod, RequestSpec, ResponseType};
///
/// let spec = RequestSpec::builder(HttpMethod::Post, "http://127.0.0.1:8000/api/create-task")
///     .json(json!({"title": "Write report"}))
///     .query_param("notify", true)
///     .header("X-Request-Source", "desktop")
///     .timeout(Duration::from_secs(30))
///     .max_retries(1)
///     .build()
///     .unwrap();
///
/// assert_eq!(spec.response_type, ResponseType::Json);
/// assert_eq!(spec.max_retries, Some(1));
/// ```
#[derive(Clone, Debug)]
pub struct RequestSpec {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The absolute target URL, without the query parameters below.
    pub url: String,
    /// Query parameters, serialized per [`RequestSpec::array_format`].
    pub query: Option<Map<String, Value>>,
    /// Layout of array-valued query parameters.
    pub array_format: ArrayFormat,
    /// Per-call headers; `None` entries delete client defaults.
    pub headers: Headers,
    /// The request body, if any.
    pub body: Option<RequestBody>,
    /// How a successful body is decoded.
    pub response_type: ResponseType,
    /// Per-attempt timeout.
    pub timeout: Option<Duration>,
    /// Caller-owned cancellation, shared across attempts.
    pub cancel: Option<CancellationHandle>,
    /// Overrides the executor's default retry count.
    pub max_retries: Option<u32>,
}

impl RequestSpec {
    /// Creates a new builder for the given method and absolute URL.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> RequestSpecBuilder {
        RequestSpecBuilder::new(method, url)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError`] if:
    /// - `url` is not an absolute URL
    /// - a body is set on a `GET` request
    /// - a header name, or a literal header value, is not valid HTTP
    pub fn verify(&self) -> Result<(), InvalidRequestError> {
        if reqwest::Url::parse(&self.url).is_err() {
            return Err(InvalidRequestError::InvalidUrl {
                url: self.url.clone(),
            });
        }

        if self.method == HttpMethod::Get && self.body.is_some() {
            return Err(InvalidRequestError::BodyNotAllowed {
                method: self.method.to_string(),
            });
        }

        for (name, value) in self.headers.iter() {
            if reqwest::header::HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(InvalidRequestError::InvalidHeaderName {
                    name: name.to_string(),
                });
            }
            if let Some(literal) = value.and_then(HeaderValue::as_static) {
                if reqwest::header::HeaderValue::from_str(literal).is_err() {
                    return Err(InvalidRequestError::InvalidHeaderValue {
                        name: name.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Builder for [`RequestSpec`].
#[derive(Debug)]
pub struct RequestSpecBuilder {
    spec: RequestSpec,
}

impl RequestSpecBuilder {
    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            spec: RequestSpec {
                method,
                url: url.into(),
                query: None,
                array_format: ArrayFormat::default(),
                headers: Headers::new(),
                body: None,
                response_type: ResponseType::default(),
                timeout: None,
                cancel: None,
                max_retries: None,
            },
        }
    }

    /// Sets all query parameters at once.
    #[must_use]
    pub fn query(mut self, query: Map<String, Value>) -> Self {
        self.spec.query = Some(query);
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.spec
            .query
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the array layout used for query parameters.
    #[must_use]
    pub const fn array_format(mut self, array_format: ArrayFormat) -> Self {
        self.spec.array_format = array_format;
        self
    }

    /// Replaces all per-call headers.
    #[must_use]
    pub fn headers(mut self, headers: Headers) -> Self {
        self.spec.headers = headers;
        self
    }

    /// Adds a single header, literal or supplier.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.spec.headers.insert(name, value);
        self
    }

    /// Removes a client default header for this call.
    #[must_use]
    pub fn without_header(mut self, name: impl Into<String>) -> Self {
        self.spec.headers.remove(name);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.spec.body = Some(body);
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(self, body: impl Into<Value>) -> Self {
        self.body(RequestBody::Json(body.into()))
    }

    /// Sets a raw byte body.
    #[must_use]
    pub fn bytes(self, data: impl Into<Vec<u8>>, content_type: Option<String>) -> Self {
        self.body(RequestBody::Bytes {
            data: data.into(),
            content_type,
        })
    }

    /// Sets a multipart body.
    #[must_use]
    pub fn multipart(self, form: MultipartForm) -> Self {
        self.body(RequestBody::Multipart(form))
    }

    /// Sets the response decoding hint.
    #[must_use]
    pub const fn response_type(mut self, response_type: ResponseType) -> Self {
        self.spec.response_type = response_type;
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.spec.timeout = Some(timeout);
        self
    }

    /// Attaches a cancellation handle.
    #[must_use]
    pub fn cancel(mut self, handle: CancellationHandle) -> Self {
        self.spec.cancel = Some(handle);
        self
    }

    /// Overrides the number of retries.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.spec.max_retries = Some(max_retries);
        self
    }

    /// Builds the [`RequestSpec`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError`] if the request fails validation.
    pub fn build(self) -> Result<RequestSpec, InvalidRequestError> {
        self.spec.verify()?;
        Ok(self.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "http://127.0.0.1:8000/api/tasks";

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_builder_defaults() {
        let spec = RequestSpec::builder(HttpMethod::Get, URL).build().unwrap();

        assert_eq!(spec.method, HttpMethod::Get);
        assert!(spec.query.is_none());
        assert!(spec.body.is_none());
        assert!(spec.headers.is_empty());
        assert_eq!(spec.response_type, ResponseType::Json);
        assert_eq!(spec.array_format, ArrayFormat::Indices);
        assert!(spec.timeout.is_none());
        assert!(spec.cancel.is_none());
        assert!(spec.max_retries.is_none());
    }

    #[test]
    fn test_builder_rejects_relative_url() {
        let result = RequestSpec::builder(HttpMethod::Get, "/api/tasks").build();
        assert!(matches!(result, Err(InvalidRequestError::InvalidUrl { .. })));
    }

    #[test]
    fn test_builder_rejects_body_on_get() {
        let result = RequestSpec::builder(HttpMethod::Get, URL)
            .json(json!({"a": 1}))
            .build();
        assert!(matches!(
            result,
            Err(InvalidRequestError::BodyNotAllowed { method }) if method == "GET"
        ));
    }

    #[test]
    fn test_builder_allows_body_on_delete_and_bodyless_post() {
        assert!(RequestSpec::builder(HttpMethod::Delete, URL)
            .json(json!({"id": "1"}))
            .build()
            .is_ok());
        assert!(RequestSpec::builder(HttpMethod::Post, URL).build().is_ok());
    }

    #[test]
    fn test_builder_rejects_invalid_header_name_and_value() {
        let bad_name = RequestSpec::builder(HttpMethod::Get, URL)
            .header("bad header", "x")
            .build();
        assert!(matches!(
            bad_name,
            Err(InvalidRequestError::InvalidHeaderName { .. })
        ));

        let bad_value = RequestSpec::builder(HttpMethod::Get, URL)
            .header("X-Test", "line\nbreak")
            .build();
        assert!(matches!(
            bad_value,
            Err(InvalidRequestError::InvalidHeaderValue { .. })
        ));
    }

    #[test]
    fn test_query_params_keep_insertion_order() {
        let spec = RequestSpec::builder(HttpMethod::Get, URL)
            .query_param("zeta", 1)
            .query_param("alpha", json!(["a", "b"]))
            .build()
            .unwrap();

        let keys: Vec<&String> = spec.query.as_ref().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_body_content_types() {
        assert_eq!(
            RequestBody::Json(json!({})).content_type(),
            Some("application/json")
        );
        assert_eq!(
            RequestBody::Bytes {
                data: vec![1],
                content_type: Some("audio/webm".to_string()),
            }
            .content_type(),
            Some("audio/webm")
        );
        assert_eq!(
            RequestBody::Multipart(MultipartForm::new()).content_type(),
            None
        );
    }

    #[test]
    fn test_bodyless_encoding_derives_removal_marker_only() {
        let headers = RequestBody::Multipart(MultipartForm::new()).headers();
        assert!(headers.is_empty());
        assert_eq!(headers.iter().count(), 1);
    }

    #[test]
    fn test_without_header_records_removal() {
        let spec = RequestSpec::builder(HttpMethod::Get, URL)
            .header("Accept", "text/plain")
            .without_header("accept")
            .build()
            .unwrap();
        assert!(!spec.headers.contains_key("Accept"));
        assert_eq!(spec.headers.iter().count(), 1);
    }

    #[test]
    fn test_multipart_form_parts() {
        let form = MultipartForm::new()
            .text("language", "en")
            .file("file", b"RIFF".to_vec(), Some("audio.webm".to_string()));
        assert_eq!(form.parts().len(), 2);
        assert!(matches!(
            &form.parts()[1],
            MultipartPart::File { file_name: Some(name), .. } if name == "audio.webm"
        ));
    }
}
