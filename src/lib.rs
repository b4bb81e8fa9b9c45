//! # Taskmaster Rust SDK
//!
//! A Rust SDK for the Taskmaster API, built around a resilient HTTP request
//! executor.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - URL joining and nested query-string serialization via [`url`]
//! - A request executor, [`clients::Fetcher`], with bounded exponential
//!   backoff, per-attempt timeouts, caller cancellation and header suppliers
//!   re-resolved on every attempt
//! - A success/failure [`clients::Outcome`] instead of errors for HTTP and
//!   transport failures
//! - A typed API client, [`api::TaskmasterClient`], for the task and
//!   transcription endpoints
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use taskmaster_sdk::{BaseUrl, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .base_url(BaseUrl::new("http://127.0.0.1:8000").unwrap())
//!     .timeout(Duration::from_secs(30))
//!     .user_agent_prefix("TaskmasterDesktop/1.0")
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Executing Requests
//!
//! ```rust,no_run
//! use taskmaster_sdk::clients::{FailureKind, Fetcher, HeaderValue, HttpMethod, RequestSpec};
//! use taskmaster_sdk::ClientConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(&ClientConfig::default())?;
//!
//! let spec = RequestSpec::builder(HttpMethod::Get, "http://127.0.0.1:8000/api/health")
//!     .header(
//!         "Authorization",
//!         HeaderValue::supplier(|| async { Some(format!("Bearer {}", "fresh-token")) }),
//!     )
//!     .build()?;
//!
//! let outcome = fetcher.fetch(&spec).await;
//! match &outcome.result {
//!     Ok(body) => println!("{:?}", body.as_json()),
//!     Err(failure) if failure.kind == FailureKind::StatusCode => {
//!         println!("server said {:?}", failure.status_code);
//!     }
//!     Err(failure) => println!("{failure}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Typed API
//!
//! ```rust,no_run
//! use taskmaster_sdk::api::{TaskmasterClient, UpdateTaskRequest};
//! use taskmaster_sdk::ClientConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TaskmasterClient::new(ClientConfig::default())?;
//! let updated = client
//!     .tasks()
//!     .update_task(
//!         &UpdateTaskRequest {
//!             title: "Renamed".to_string(),
//!             ..UpdateTaskRequest::default()
//!         },
//!         None,
//!     )
//!     .await?;
//! println!("{} is now {:?}", updated.data.id, updated.data.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Newtypes and builders validate on construction
//! - **Thread-safe**: Clients and configuration are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio runtime
//! - **Failures are values**: The executor never returns `Err` for HTTP errors

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod url;

// Re-export public types at crate root for convenience
pub use config::{BaseUrl, ClientConfig, ClientConfigBuilder, Environment, SDK_VERSION};
pub use error::ConfigError;

// Re-export executor types
pub use clients::{
    CancellationHandle, Failure, FailureKind, Fetcher, HttpMethod, Outcome, RequestSpec,
    RetryPolicy,
};
