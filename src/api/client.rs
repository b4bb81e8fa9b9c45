//! The typed Taskmaster API client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api::errors::ApiError;
use crate::api::resources::{SystemClient, TasksClient, TranscriptionClient};
use crate::clients::{
    CancellationHandle, Fetcher, HeaderValue, Headers, HttpMethod, RawResponseMeta, RequestBody,
    RequestSpec, ResponseBody,
};
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::url::join;

/// Per-call settings for typed API calls.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use taskmaster_sdk::api::RequestOptions;
/// use taskmaster_sdk::clients::CancellationHandle;
///
/// let cancel = CancellationHandle::new();
/// let options = RequestOptions::new()
///     .timeout(Duration::from_secs(5))
///     .max_retries(0)
///     .cancel(cancel.clone())
///     .header("X-Request-Source", "tray");
///
/// assert_eq!(options.max_retries, Some(0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// Overrides the configured per-attempt timeout.
    pub timeout: Option<Duration>,
    /// Overrides the configured retry count.
    pub max_retries: Option<u32>,
    /// Cancels the call when fired.
    pub cancel: Option<CancellationHandle>,
    /// Extra headers; removal markers delete configured defaults.
    pub headers: Headers,
    /// Extra query parameters.
    pub query_params: Option<Map<String, Value>>,
}

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry count.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Attaches a cancellation handle.
    #[must_use]
    pub fn cancel(mut self, handle: CancellationHandle) -> Self {
        self.cancel = Some(handle);
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_params
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// A decoded response together with its raw metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithRawResponse<T> {
    /// The decoded body.
    pub data: T,
    /// Status and headers of the response.
    pub raw_response: RawResponseMeta,
}

impl<T> WithRawResponse<T> {
    /// Discards the metadata.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }
}

/// Client for the Taskmaster REST API.
///
/// Each call goes through the [`Fetcher`], so it inherits retries, timeouts
/// and cancellation. Failures are returned as [`ApiError`].
///
/// # Thread Safety
///
/// `TaskmasterClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,no_run
/// use taskmaster_sdk::api::{CreateTaskRequest, TaskmasterClient};
/// use taskmaster_sdk::ClientConfig;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TaskmasterClient::new(ClientConfig::default())?;
///
/// let health = client.system().get_health(None).await?;
/// println!("server says {}", health.data.status);
///
/// let task = client
///     .tasks()
///     .create_task(&CreateTaskRequest::new("Write report", "Quarterly numbers"), None)
///     .await?;
/// println!("created {}", task.data.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TaskmasterClient {
    fetcher: Fetcher,
    config: ClientConfig,
}

// Verify TaskmasterClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TaskmasterClient>();
};

impl TaskmasterClient {
    /// Creates a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientInit`] if the HTTP stack cannot be
    /// initialized.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self { fetcher, config })
    }

    /// Creates a client around an existing executor.
    #[must_use]
    pub const fn with_fetcher(fetcher: Fetcher, config: ClientConfig) -> Self {
        Self { fetcher, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the underlying executor.
    #[must_use]
    pub const fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Health endpoints.
    #[must_use]
    pub const fn system(&self) -> SystemClient<'_> {
        SystemClient::new(self)
    }

    /// Task endpoints.
    #[must_use]
    pub const fn tasks(&self) -> TasksClient<'_> {
        TasksClient::new(self)
    }

    /// Transcription endpoints.
    #[must_use]
    pub const fn transcription(&self) -> TranscriptionClient<'_> {
        TranscriptionClient::new(self)
    }

    /// Sends a request to `path` and decodes the JSON response as `T`.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        options: Option<&RequestOptions>,
    ) -> Result<WithRawResponse<T>, ApiError> {
        let url = join(self.config.base_url().as_ref(), &[path]);
        let mut builder =
            RequestSpec::builder(method, url).array_format(self.config.array_format());

        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(options) = options {
            builder = builder.headers(options.headers.clone());
            if let Some(query) = &options.query_params {
                builder = builder.query(query.clone());
            }
            if let Some(timeout) = options.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(max_retries) = options.max_retries {
                builder = builder.max_retries(max_retries);
            }
            if let Some(cancel) = &options.cancel {
                builder = builder.cancel(cancel.clone());
            }
        }

        let spec = builder.build()?;
        let (result, raw_response) = self.fetcher.fetch(&spec).await.into_parts();

        match result {
            Ok(body) => match deserialize_body(body) {
                Ok(data) => Ok(WithRawResponse { data, raw_response }),
                Err(source) => Err(ApiError::Deserialize {
                    source,
                    raw_response,
                }),
            },
            Err(failure) => {
                tracing::debug!("{} {} failed: {}", method, path, failure);
                Err(ApiError::from_failure(failure, raw_response, method, path))
            }
        }
    }
}

fn deserialize_body<T: DeserializeOwned>(body: ResponseBody) -> Result<T, serde_json::Error> {
    let value = match body {
        ResponseBody::Json(value) => value,
        ResponseBody::Text(text) => Value::String(text),
        ResponseBody::Binary(_) | ResponseBody::Empty => Value::Null,
    };
    serde_json::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HealthResponse;
    use serde_json::json;

    #[test]
    fn test_deserialize_json_body() {
        let health: HealthResponse =
            deserialize_body(ResponseBody::Json(json!({"status": "OK"}))).unwrap();
        assert_eq!(health.status, "OK");
    }

    #[test]
    fn test_deserialize_empty_body_into_option() {
        let nothing: Option<HealthResponse> = deserialize_body(ResponseBody::Empty).unwrap();
        assert!(nothing.is_none());

        let required: Result<HealthResponse, _> = deserialize_body(ResponseBody::Empty);
        assert!(required.is_err());
    }

    #[test]
    fn test_request_options_builder() {
        let options = RequestOptions::new()
            .query_param("verbose", true)
            .header("X-A", "1");
        assert_eq!(
            options.query_params.as_ref().and_then(|q| q.get("verbose")),
            Some(&json!(true))
        );
        assert!(options.headers.contains_key("x-a"));
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_client_exposes_config() {
        let client = TaskmasterClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.config().base_url().as_ref(), "http://127.0.0.1:8000");
        assert_eq!(client.fetcher().retry_policy().max_retries, 2);
    }
}
