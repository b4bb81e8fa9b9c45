//! The request executor.
//!
//! [`Fetcher`] sends one [`RequestSpec`] with retries, timeouts and
//! cancellation, and normalizes whatever happens into an [`Outcome`].

use std::error::Error as _;
use std::time::Duration;

use crate::clients::headers::{merge_defined_headers, merge_headers, resolve_headers, Headers};
use crate::clients::http_request::{RequestBody, RequestSpec, ResponseType};
use crate::clients::http_response::{
    decode_error_body, is_null_body_status, BinaryResponse, RawResponseMeta, ResponseBody,
};
use crate::clients::outcome::{Failure, FailureKind, Outcome};
use crate::clients::retry::RetryPolicy;
use crate::clients::signals::{CancelReason, CancellationHandle, ComposedCancellation};
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::url::{create_request_url, QueryOptions};

/// Executes requests against an HTTP server.
///
/// The executor handles:
/// - Query serialization and header merging
/// - Per-attempt resolution of header suppliers
/// - Retries of 408, 429 and 5xx responses with exponential backoff
/// - Per-attempt timeouts and caller cancellation
/// - Decoding success and error bodies
///
/// Ordinary HTTP errors and transport failures never surface as `Err` from
/// [`Fetcher::fetch`]; they are reported inside the returned [`Outcome`].
///
/// # Thread Safety
///
/// `Fetcher` is `Send + Sync` and holds no mutable state, so one instance can
/// serve any number of concurrent calls.
///
/// # Example
///
/// ```rust,no_run
/// use taskmaster_sdk::clients::{Fetcher, HttpMethod, RequestSpec};
/// use taskmaster_sdk::ClientConfig;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::new(&ClientConfig::default())?;
/// let spec = RequestSpec::builder(HttpMethod::Get, "http://127.0.0.1:8000/api/health").build()?;
///
/// let outcome = fetcher.fetch(&spec).await;
/// match outcome.result {
///     Ok(body) => println!("healthy: {:?}", body.as_json()),
///     Err(failure) => println!("failed: {failure}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    default_headers: Headers,
    timeout: Option<Duration>,
    retry_policy: RetryPolicy,
}

// Verify Fetcher is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Fetcher>();
};

/// How a single attempt ended.
enum Attempt {
    /// The response head arrived.
    Response(reqwest::Response),
    /// The composed cancellation fired first.
    Cancelled(CancelReason),
    /// The transport failed before a response head arrived.
    Transport(reqwest::Error),
}

/// Why reading a response body stopped early.
enum BodyError {
    Cancelled(String),
    Transport(reqwest::Error),
}

impl Fetcher {
    /// Creates an executor from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientInit`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|err| ConfigError::HttpClientInit {
                reason: err.to_string(),
            })?;
        Ok(Self::with_client(client, config))
    }

    /// Creates an executor around an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            default_headers: config.request_headers(),
            timeout: config.timeout(),
            retry_policy: config.retry_policy().clone(),
        }
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Executes `spec` and returns its normalized outcome.
    ///
    /// Attempts are strictly sequential. Each attempt resolves header
    /// suppliers afresh and starts its own timeout; the cancellation handle of
    /// `spec` is shared by all attempts and by the waits between them.
    pub async fn fetch(&self, spec: &RequestSpec) -> Outcome {
        let url = create_request_url(
            &spec.url,
            spec.query.as_ref(),
            QueryOptions::with_array_format(spec.array_format),
        );
        let request_url = match reqwest::Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(err) => {
                return Outcome::failure(
                    Failure::network_unknown(format!("Invalid request URL '{url}': {err}")),
                    RawResponseMeta::unknown(),
                );
            }
        };

        let body_headers = spec
            .body
            .as_ref()
            .map(RequestBody::headers)
            .unwrap_or_default();
        let headers = merge_headers([
            &self.default_headers,
            &merge_defined_headers([&body_headers]),
            &spec.headers,
        ]);

        let timeout = spec.timeout.or(self.timeout);
        let max_retries = spec.max_retries.unwrap_or(self.retry_policy.max_retries);
        let cancel = spec.cancel.as_ref();
        let mut retry: u32 = 0;

        loop {
            tracing::debug!(
                "Sending {} {} (attempt {} of {})",
                spec.method,
                request_url,
                retry + 1,
                max_retries.saturating_add(1)
            );
            let attempt = self.attempt(spec, &request_url, &headers, timeout).await;

            let retryable = match &attempt {
                Attempt::Response(response) => {
                    let status = response.status().as_u16();
                    tracing::trace!("Received status {} from {}", status, request_url);
                    RetryPolicy::is_retryable_status(status)
                }
                Attempt::Transport(err) => {
                    self.retry_policy.retry_transport_errors
                        && classify_transport_error(err).kind == FailureKind::NetworkUnknown
                }
                Attempt::Cancelled(_) => false,
            };

            if retryable && retry < max_retries {
                retry += 1;
                if let Some(reason) = self.backoff(retry, cancel).await {
                    tracing::debug!(
                        "Request to {} cancelled during backoff: {}",
                        request_url,
                        reason
                    );
                    return Outcome::failure(Failure::aborted(reason), RawResponseMeta::aborted());
                }
                continue;
            }

            if retryable && max_retries > 0 {
                tracing::warn!(
                    "Giving up on {} {} after {} attempts",
                    spec.method,
                    request_url,
                    retry + 1
                );
            }

            return Self::finish(spec, &request_url, attempt).await;
        }
    }

    /// Runs one attempt up to the arrival of the response head.
    async fn attempt(
        &self,
        spec: &RequestSpec,
        request_url: &reqwest::Url,
        headers: &Headers,
        timeout: Option<Duration>,
    ) -> Attempt {
        let mut signal = ComposedCancellation::new(timeout, spec.cancel.as_ref());
        if let Some(reason) = signal.pre_cancelled() {
            return Attempt::Cancelled(reason);
        }

        let resolved = tokio::select! {
            biased;
            reason = signal.fired() => return Attempt::Cancelled(reason),
            resolved = resolve_headers(headers) => resolved,
        };

        let mut builder = self
            .client
            .request(spec.method.to_reqwest(), request_url.clone());
        // reqwest appends the boundary-bearing Content-Type for multipart forms.
        let multipart = matches!(spec.body, Some(RequestBody::Multipart(_)));
        for (name, value) in resolved {
            if multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            builder = builder.header(name, value);
        }
        builder = match &spec.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Bytes { data, .. }) => builder.body(data.clone()),
            Some(RequestBody::Multipart(form)) => builder.multipart(form.to_form()),
            None => builder,
        };

        // Dropping the losing `send` future aborts the in-flight request.
        tokio::select! {
            biased;
            reason = signal.fired() => {
                tracing::debug!("Request to {} cancelled: {}", request_url, reason);
                Attempt::Cancelled(reason)
            }
            result = builder.send() => match result {
                Ok(response) => Attempt::Response(response),
                Err(err) => Attempt::Transport(err),
            },
        }
    }

    /// Waits before retry `retry`. Returns the reason if cancelled meanwhile.
    async fn backoff(&self, retry: u32, cancel: Option<&CancellationHandle>) -> Option<String> {
        let delay = self.retry_policy.delay(retry);
        tracing::debug!("Retrying in {:?} (retry {})", delay, retry);

        match cancel {
            Some(handle) => tokio::select! {
                biased;
                reason = handle.cancelled() => Some(reason),
                () = tokio::time::sleep(delay) => None,
            },
            None => {
                tokio::time::sleep(delay).await;
                None
            }
        }
    }

    /// Turns the final attempt into an [`Outcome`].
    async fn finish(spec: &RequestSpec, request_url: &reqwest::Url, attempt: Attempt) -> Outcome {
        match attempt {
            Attempt::Cancelled(CancelReason::Timeout) => {
                Outcome::failure(Failure::timeout(), RawResponseMeta::aborted())
            }
            Attempt::Cancelled(CancelReason::External(reason)) => {
                Outcome::failure(Failure::aborted(reason), RawResponseMeta::aborted())
            }
            Attempt::Transport(err) => {
                let failure = classify_transport_error(&err);
                let meta = if failure.kind == FailureKind::Timeout {
                    RawResponseMeta::aborted()
                } else {
                    RawResponseMeta::unknown()
                };
                Outcome::failure(failure, meta)
            }
            Attempt::Response(response) => {
                Self::read_response(spec, request_url, response).await
            }
        }
    }

    async fn read_response(
        spec: &RequestSpec,
        request_url: &reqwest::Url,
        response: reqwest::Response,
    ) -> Outcome {
        let meta = RawResponseMeta::from_response(&response, request_url);
        let status = meta.status;
        let cancel = spec.cancel.as_ref();

        if !meta.is_success() {
            let content_type = meta.content_type().map(str::to_string);
            return match read_text(response, cancel).await {
                Ok(text) => Outcome::failure(
                    Failure::status_code(status, decode_error_body(content_type.as_deref(), text)),
                    meta,
                ),
                Err(err) => Outcome::failure(body_failure(err), meta),
            };
        }

        if is_null_body_status(status) {
            return Outcome::success(ResponseBody::Empty, meta);
        }

        match spec.response_type {
            ResponseType::Binary | ResponseType::Stream => {
                Outcome::success(ResponseBody::Binary(BinaryResponse::new(response)), meta)
            }
            ResponseType::Text => match read_text(response, cancel).await {
                Ok(text) => Outcome::success(ResponseBody::Text(text), meta),
                Err(err) => Outcome::failure(body_failure(err), meta),
            },
            ResponseType::Json => match read_text(response, cancel).await {
                Ok(text) if text.is_empty() => Outcome::success(ResponseBody::Empty, meta),
                Ok(text) => match serde_json::from_str(&text) {
                    Ok(value) => Outcome::success(ResponseBody::Json(value), meta),
                    Err(err) => {
                        tracing::debug!(
                            "Response body from {} is not JSON: {}",
                            request_url,
                            err
                        );
                        Outcome::failure(Failure::non_json_body(status, text), meta)
                    }
                },
                Err(err) => Outcome::failure(body_failure(err), meta),
            },
        }
    }
}

/// Reads the full body as text, giving up if `cancel` fires first.
async fn read_text(
    response: reqwest::Response,
    cancel: Option<&CancellationHandle>,
) -> Result<String, BodyError> {
    match cancel {
        Some(handle) => tokio::select! {
            biased;
            reason = handle.cancelled() => Err(BodyError::Cancelled(reason)),
            text = response.text() => text.map_err(BodyError::Transport),
        },
        None => response.text().await.map_err(BodyError::Transport),
    }
}

fn body_failure(err: BodyError) -> Failure {
    match err {
        BodyError::Cancelled(reason) => Failure::aborted(reason),
        BodyError::Transport(err) => classify_transport_error(&err),
    }
}

/// Maps a transport error onto a failure kind.
fn classify_transport_error(err: &reqwest::Error) -> Failure {
    if err.is_timeout() {
        return Failure::timeout();
    }

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    Failure::network_unknown(message)
}
