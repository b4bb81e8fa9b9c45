//! Typed client for the Taskmaster REST API.
//!
//! This module is a thin layer over [`Fetcher`](crate::clients::Fetcher): it
//! joins endpoint paths onto the configured base URL, serializes request
//! models, decodes responses into typed models and turns executor failures
//! into [`ApiError`].
//!
//! # Overview
//!
//! - [`TaskmasterClient`]: entry point
//! - [`SystemClient`], [`TasksClient`], [`TranscriptionClient`]: endpoint groups
//! - [`RequestOptions`]: per-call timeout, retries, cancellation, headers and query
//! - [`WithRawResponse`]: a decoded body with its response metadata
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use taskmaster_sdk::api::{CreateTranscriptionRequest, RequestOptions, TaskmasterClient};
//! use taskmaster_sdk::ClientConfig;
//!
//! # async fn run(audio: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = TaskmasterClient::new(ClientConfig::default())?;
//! let options = RequestOptions::new().timeout(Duration::from_secs(120));
//!
//! let transcript = client
//!     .transcription()
//!     .create_transcription(
//!         &CreateTranscriptionRequest::new(audio).file_name("recording.webm"),
//!         Some(&options),
//!     )
//!     .await?;
//! println!("{}", transcript.data.text);
//! # Ok(())
//! # }
//! ```

mod client;
mod errors;
mod resources;
mod types;

pub use client::{RequestOptions, TaskmasterClient, WithRawResponse};
pub use errors::ApiError;
pub use resources::{
    SystemClient, TasksClient, TranscriptionClient, CREATE_TASK_PATH, CREATE_TRANSCRIPTION_PATH,
    DEFAULT_AUDIO_FILE_NAME, DELETE_TASK_PATH, HEALTH_PATH, UPDATE_TASK_PATH,
};
pub use types::{
    CreateTaskRequest, CreateTranscriptionRequest, HealthResponse, Task, TaskStatus,
    TranscriptionResponse, UpdateTaskRequest,
};
