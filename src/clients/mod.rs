//! The resilient request executor.
//!
//! This module sends HTTP requests described by a [`RequestSpec`] and reports
//! every result, including HTTP errors and transport failures, as an
//! [`Outcome`] instead of an `Err`.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Fetcher`]: the executor
//! - [`RequestSpec`]: an immutable description of one call
//! - [`Outcome`]: the normalized result, a [`ResponseBody`] or a [`Failure`]
//! - [`RawResponseMeta`]: status and headers of the last attempt
//! - [`HeaderValue`] and [`Headers`]: literal or supplier-backed headers
//! - [`RetryPolicy`]: bounded exponential backoff with jitter
//! - [`CancellationHandle`]: caller-owned cancellation
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use taskmaster_sdk::clients::{
//!     CancellationHandle, FailureKind, Fetcher, HttpMethod, RequestSpec,
//! };
//! use taskmaster_sdk::ClientConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(&ClientConfig::default())?;
//! let cancel = CancellationHandle::new();
//!
//! let spec = RequestSpec::builder(HttpMethod::Get, "http://127.0.0.1:8000/api/health")
//!     .timeout(Duration::from_secs(5))
//!     .cancel(cancel.clone())
//!     .build()?;
//!
//! let outcome = fetcher.fetch(&spec).await;
//! if let Err(failure) = &outcome.result {
//!     if failure.kind == FailureKind::Timeout {
//!         println!("server too slow");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Retry Behavior
//!
//! - **408, 429 and 5xx**: retried, by default twice, waiting
//!   `1s * 2^(n-1)` (capped at 60s, jittered by 20%) before retry `n`
//! - **Other statuses**: returned immediately as [`FailureKind::StatusCode`]
//! - **Timeouts and cancellations**: never retried
//! - **Other transport failures**: retried only when
//!   [`RetryPolicy::retry_transport_errors`] is set

mod errors;
mod headers;
mod http_client;
mod http_request;
mod http_response;
mod outcome;
mod retry;
mod signals;

pub use errors::InvalidRequestError;
pub use headers::{
    merge_defined_headers, merge_headers, resolve_headers, HeaderValue, Headers, SupplierFuture,
};
pub use http_client::Fetcher;
pub use http_request::{
    HttpMethod, MultipartForm, MultipartPart, RequestBody, RequestSpec, RequestSpecBuilder,
    ResponseType,
};
pub use http_response::{
    decode_error_body, is_json_media_type, is_null_body_status, BinaryResponse, RawResponseMeta,
    ResponseBody, ResponseKind, CLIENT_CLOSED_REQUEST,
};
pub use outcome::{ErrorBody, Failure, FailureKind, Outcome};
pub use retry::{
    RetryPolicy, DEFAULT_MAX_RETRIES, INITIAL_RETRY_DELAY, JITTER_FACTOR, MAX_RETRY_DELAY,
};
pub use signals::{CancelReason, CancellationHandle, ComposedCancellation, DEFAULT_ABORT_REASON};
