//! Configuration types for the Taskmaster SDK.
//!
//! # Overview
//!
//! - [`ClientConfig`]: immutable settings shared by every request
//! - [`ClientConfigBuilder`]: a builder for constructing [`ClientConfig`] instances
//! - [`BaseUrl`]: a validated absolute base URL
//! - [`Environment`]: well-known deployments
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use taskmaster_sdk::{BaseUrl, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .base_url(BaseUrl::new("http://127.0.0.1:9000").unwrap())
//!     .timeout(Duration::from_secs(10))
//!     .max_retries(4)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "http://127.0.0.1:9000");
//! assert_eq!(config.retry_policy().max_retries, 4);
//! ```

mod newtypes;

pub use newtypes::{BaseUrl, Environment};

use std::time::Duration;

use crate::clients::{HeaderValue, Headers, RetryPolicy};
use crate::error::ConfigError;
use crate::url::ArrayFormat;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings shared by every request of a client.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`, and is never mutated after
/// [`ClientConfigBuilder::build`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: BaseUrl,
    default_headers: Headers,
    timeout: Option<Duration>,
    retry_policy: RetryPolicy,
    user_agent_prefix: Option<String>,
    array_format: ArrayFormat,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the user-supplied default headers.
    #[must_use]
    pub const fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    /// Returns the default per-attempt timeout, `None` if disabled.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the array layout used for query parameters.
    #[must_use]
    pub const fn array_format(&self) -> ArrayFormat {
        self.array_format
    }

    /// Returns the `User-Agent` sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> String {
        let prefix = self
            .user_agent_prefix
            .as_deref()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        format!("{prefix}Taskmaster SDK v{SDK_VERSION} | Rust {rust_version}")
    }

    /// Returns the SDK headers followed by the user-supplied defaults.
    #[must_use]
    pub fn request_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("User-Agent", self.user_agent());
        headers.insert("Accept", "application/json");
        headers.insert("X-Taskmaster-Language", "Rust");
        headers.insert("X-Taskmaster-Sdk-Version", SDK_VERSION);
        crate::clients::merge_headers([&headers, &self.default_headers])
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Environment::default().base_url(),
            default_headers: Headers::new(),
            timeout: Some(DEFAULT_TIMEOUT),
            retry_policy: RetryPolicy::default(),
            user_agent_prefix: None,
            array_format: ArrayFormat::Repeat,
        }
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// # Defaults
///
/// - base URL: [`Environment::Local`]
/// - `timeout`: 60 seconds
/// - `retry_policy`: [`RetryPolicy::default`] (2 retries)
/// - `array_format`: [`ArrayFormat::Repeat`]
/// - no extra headers, no user agent prefix
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<BaseUrl>,
    environment: Option<Environment>,
    default_headers: Headers,
    timeout: Option<Option<Duration>>,
    retry_policy: Option<RetryPolicy>,
    max_retries: Option<u32>,
    user_agent_prefix: Option<String>,
    array_format: Option<ArrayFormat>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL. Takes precedence over [`Self::environment`].
    #[must_use]
    pub fn base_url(mut self, base_url: BaseUrl) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Selects a well-known environment.
    #[must_use]
    pub const fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Adds a default header sent with every request.
    #[must_use]
    pub fn default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<HeaderValue>,
    ) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Replaces all default headers.
    #[must_use]
    pub fn default_headers(mut self, headers: Headers) -> Self {
        self.default_headers = headers;
        self
    }

    /// Sets the default per-attempt timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(Some(timeout));
        self
    }

    /// Disables the default timeout.
    #[must_use]
    pub const fn no_timeout(mut self) -> Self {
        self.timeout = Some(None);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Overrides only the retry count of the policy.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the user agent prefix.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the array layout used for query parameters.
    #[must_use]
    pub const fn array_format(mut self, array_format: ArrayFormat) -> Self {
        self.array_format = Some(array_format);
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRetryPolicy`] for an inconsistent policy
    /// and [`ConfigError::InvalidHeader`] for a default header that cannot be
    /// sent over HTTP.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let mut retry_policy = self.retry_policy.unwrap_or_default();
        if let Some(max_retries) = self.max_retries {
            retry_policy.max_retries = max_retries;
        }
        retry_policy.validate()?;

        for (name, value) in self.default_headers.iter() {
            validate_header(name, value)?;
        }
        if let Some(prefix) = &self.user_agent_prefix {
            if reqwest::header::HeaderValue::from_str(prefix).is_err() {
                return Err(ConfigError::InvalidHeader {
                    name: "User-Agent".to_string(),
                    reason: "prefix contains characters not allowed in a header".to_string(),
                });
            }
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| self.environment.unwrap_or_default().base_url());

        Ok(ClientConfig {
            base_url,
            default_headers: self.default_headers,
            timeout: self.timeout.unwrap_or(Some(DEFAULT_TIMEOUT)),
            retry_policy,
            user_agent_prefix: self.user_agent_prefix,
            array_format: self.array_format.unwrap_or(ArrayFormat::Repeat),
        })
    }
}

fn validate_header(name: &str, value: Option<&HeaderValue>) -> Result<(), ConfigError> {
    if reqwest::header::HeaderName::from_bytes(name.as_bytes()).is_err() {
        return Err(ConfigError::InvalidHeader {
            name: name.to_string(),
            reason: "not a valid header name".to_string(),
        });
    }
    if let Some(literal) = value.and_then(HeaderValue::as_static) {
        if reqwest::header::HeaderValue::from_str(literal).is_err() {
            return Err(ConfigError::InvalidHeader {
                name: name.to_string(),
                reason: "value contains characters not allowed in a header".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(HeaderValue::as_static)
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ClientConfig::builder().build().unwrap();

        assert_eq!(config.base_url().as_ref(), "http://127.0.0.1:8000");
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.retry_policy(), &RetryPolicy::default());
        assert_eq!(config.array_format(), ArrayFormat::Repeat);
        assert!(config.default_headers().is_empty());
        assert!(config.user_agent_prefix().is_none());
    }

    #[test]
    fn test_base_url_takes_precedence_over_environment() {
        let config = ClientConfig::builder()
            .environment(Environment::Local)
            .base_url(BaseUrl::new("https://tasks.example.com").unwrap())
            .build()
            .unwrap();

        assert_eq!(config.base_url().as_ref(), "https://tasks.example.com");
    }

    #[test]
    fn test_max_retries_overrides_policy_count_only() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_millis(5),
            ..RetryPolicy::default()
        };
        let config = ClientConfig::builder()
            .retry_policy(policy)
            .max_retries(0)
            .build()
            .unwrap();

        assert_eq!(config.retry_policy().max_retries, 0);
        assert_eq!(config.retry_policy().initial_delay, Duration::from_millis(5));
    }

    #[test]
    fn test_invalid_retry_policy_is_rejected() {
        let result = ClientConfig::builder()
            .retry_policy(RetryPolicy {
                jitter: -0.1,
                ..RetryPolicy::default()
            })
            .build();

        assert!(matches!(result, Err(ConfigError::InvalidRetryPolicy { .. })));
    }

    #[test]
    fn test_invalid_default_header_is_rejected() {
        let result = ClientConfig::builder()
            .default_header("X-Bad", "a\r\nb")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidHeader { name, .. }) if name == "X-Bad"
        ));

        let result = ClientConfig::builder().default_header("bad name", "x").build();
        assert!(matches!(result, Err(ConfigError::InvalidHeader { .. })));
    }

    #[test]
    fn test_no_timeout() {
        let config = ClientConfig::builder().no_timeout().build().unwrap();
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_user_agent_format() {
        let config = ClientConfig::builder().build().unwrap();
        let user_agent = config.user_agent();
        assert!(user_agent.starts_with("Taskmaster SDK v"));
        assert!(user_agent.contains(" | Rust "));

        let config = ClientConfig::builder()
            .user_agent_prefix("Desktop/2.1")
            .build()
            .unwrap();
        assert!(config.user_agent().starts_with("Desktop/2.1 | Taskmaster SDK v"));
    }

    #[test]
    fn test_request_headers_include_sdk_identification() {
        let config = ClientConfig::builder()
            .default_header("accept", "text/plain")
            .default_header("X-Team", "core")
            .build()
            .unwrap();
        let headers = config.request_headers();

        assert_eq!(static_header(&headers, "Accept"), Some("text/plain"));
        assert_eq!(static_header(&headers, "X-Taskmaster-Language"), Some("Rust"));
        assert_eq!(
            static_header(&headers, "X-Taskmaster-Sdk-Version"),
            Some(SDK_VERSION)
        );
        assert_eq!(static_header(&headers, "X-Team"), Some("core"));
        assert!(headers.contains_key("User-Agent"));
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = ClientConfig::builder().build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned.base_url(), config.base_url());

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("ClientConfig"));
    }
}
