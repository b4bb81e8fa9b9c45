//! Resource clients grouping the Taskmaster endpoints.
//!
//! Each resource borrows its [`TaskmasterClient`]; obtain one with
//! [`TaskmasterClient::system`], [`TaskmasterClient::tasks`] or
//! [`TaskmasterClient::transcription`].

use crate::api::client::{RequestOptions, TaskmasterClient, WithRawResponse};
use crate::api::errors::ApiError;
use crate::api::types::{
    CreateTaskRequest, CreateTranscriptionRequest, HealthResponse, Task, TranscriptionResponse,
    UpdateTaskRequest,
};
use crate::clients::{HttpMethod, MultipartForm, RequestBody};

/// `GET /api/health`
pub const HEALTH_PATH: &str = "/api/health";
/// `POST /api/create-task`
pub const CREATE_TASK_PATH: &str = "/api/create-task";
/// `PUT /api/update-task`
pub const UPDATE_TASK_PATH: &str = "/api/update-task";
/// `DELETE /api/delete-task`
pub const DELETE_TASK_PATH: &str = "/api/delete-task";
/// `POST /api/create-transcription`
pub const CREATE_TRANSCRIPTION_PATH: &str = "/api/create-transcription";

/// File name sent when a transcription request does not name its upload.
pub const DEFAULT_AUDIO_FILE_NAME: &str = "audio";

fn json_body<T: serde::Serialize>(request: &T) -> Result<RequestBody, ApiError> {
    serde_json::to_value(request)
        .map(RequestBody::Json)
        .map_err(ApiError::Serialize)
}

/// Server health.
#[derive(Clone, Copy, Debug)]
pub struct SystemClient<'a> {
    client: &'a TaskmasterClient,
}

impl<'a> SystemClient<'a> {
    pub(crate) const fn new(client: &'a TaskmasterClient) -> Self {
        Self { client }
    }

    /// Checks that the server is up.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails.
    pub async fn get_health(
        &self,
        options: Option<&RequestOptions>,
    ) -> Result<WithRawResponse<HealthResponse>, ApiError> {
        self.client
            .send(HttpMethod::Get, HEALTH_PATH, None, options)
            .await
    }
}

/// Task management.
#[derive(Clone, Copy, Debug)]
pub struct TasksClient<'a> {
    client: &'a TaskmasterClient,
}

impl<'a> TasksClient<'a> {
    pub(crate) const fn new(client: &'a TaskmasterClient) -> Self {
        Self { client }
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails.
    pub async fn create_task(
        &self,
        request: &CreateTaskRequest,
        options: Option<&RequestOptions>,
    ) -> Result<WithRawResponse<Task>, ApiError> {
        let body = json_body(request)?;
        self.client
            .send(HttpMethod::Post, CREATE_TASK_PATH, Some(body), options)
            .await
    }

    /// Updates a task.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails.
    pub async fn update_task(
        &self,
        request: &UpdateTaskRequest,
        options: Option<&RequestOptions>,
    ) -> Result<WithRawResponse<Task>, ApiError> {
        let body = json_body(request)?;
        self.client
            .send(HttpMethod::Put, UPDATE_TASK_PATH, Some(body), options)
            .await
    }

    /// Deletes a task and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails.
    pub async fn delete_task(
        &self,
        options: Option<&RequestOptions>,
    ) -> Result<WithRawResponse<Task>, ApiError> {
        self.client
            .send(HttpMethod::Delete, DELETE_TASK_PATH, None, options)
            .await
    }
}

/// Speech-to-text.
#[derive(Clone, Copy, Debug)]
pub struct TranscriptionClient<'a> {
    client: &'a TaskmasterClient,
}

impl<'a> TranscriptionClient<'a> {
    pub(crate) const fn new(client: &'a TaskmasterClient) -> Self {
        Self { client }
    }

    /// Uploads audio as the multipart part `file` and returns its transcript.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails.
    pub async fn create_transcription(
        &self,
        request: &CreateTranscriptionRequest,
        options: Option<&RequestOptions>,
    ) -> Result<WithRawResponse<TranscriptionResponse>, ApiError> {
        let file_name = request
            .file_name
            .clone()
            .unwrap_or_else(|| DEFAULT_AUDIO_FILE_NAME.to_string());
        let form = MultipartForm::new().file("file", request.file.clone(), Some(file_name));
        self.client
            .send(
                HttpMethod::Post,
                CREATE_TRANSCRIPTION_PATH,
                Some(RequestBody::Multipart(form)),
                options,
            )
            .await
    }
}
