//! Request and response models of the Taskmaster API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
    /// Abandoned.
    Cancelled,
}

/// A task as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Task {
    /// Server-assigned identifier (a UUID).
    pub id: String,

    /// Short title.
    pub title: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// Priority, higher is more urgent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Estimated effort in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,

    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    /// Identifiers of tasks that must be completed first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite_tasks: Option<Vec<String>>,
}

/// Body of `POST /api/create-task`.
///
/// # Example
///
/// ```rust
/// use taskmaster_sdk::api::{CreateTaskRequest, TaskStatus};
///
/// let request = CreateTaskRequest::new("Write report", "Quarterly numbers")
///     .status(TaskStatus::InProgress)
///     .priority(2);
///
/// let json = serde_json::to_value(&request).unwrap();
/// assert_eq!(json["status"], "IN_PROGRESS");
/// assert!(json.get("deadline").is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTaskRequest {
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Initial status.
    pub status: TaskStatus,
    /// Priority, higher is more urgent.
    pub priority: i32,
    /// Estimated effort in seconds.
    pub duration_seconds: i64,
    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Identifiers of tasks that must be completed first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite_tasks: Option<Vec<String>>,
}

impl CreateTaskRequest {
    /// Creates a `TODO` task with zero priority and duration.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: TaskStatus::Todo,
            priority: 0,
            duration_seconds: 0,
            deadline: None,
            prerequisite_tasks: None,
        }
    }

    /// Sets the status.
    #[must_use]
    pub const fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the estimated duration in seconds.
    #[must_use]
    pub const fn duration_seconds(mut self, seconds: i64) -> Self {
        self.duration_seconds = seconds;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the prerequisite task identifiers.
    #[must_use]
    pub fn prerequisite_tasks(mut self, ids: Vec<String>) -> Self {
        self.prerequisite_tasks = Some(ids);
        self
    }
}

/// Body of `PUT /api/update-task`. Only `title` is required.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    /// Short title.
    pub title: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// New estimated effort in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    /// New due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// New prerequisite task identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite_tasks: Option<Vec<String>>,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Server-reported status, e.g. `"OK"`.
    pub status: String,
}

/// Audio upload for `POST /api/create-transcription`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTranscriptionRequest {
    /// Encoded audio.
    pub file: Vec<u8>,
    /// File name reported to the server, e.g. `recording.webm`.
    pub file_name: Option<String>,
}

impl CreateTranscriptionRequest {
    /// Wraps audio bytes.
    #[must_use]
    pub fn new(file: impl Into<Vec<u8>>) -> Self {
        Self {
            file: file.into(),
            file_name: None,
        }
    }

    /// Sets the file name.
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// Response of `POST /api/create-transcription`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptionResponse {
    /// The transcribed text.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_task_status_wire_names() {
        let statuses = [
            (TaskStatus::Todo, "TODO"),
            (TaskStatus::InProgress, "IN_PROGRESS"),
            (TaskStatus::Completed, "COMPLETED"),
            (TaskStatus::Cancelled, "CANCELLED"),
        ];
        for (status, wire) in statuses {
            assert_eq!(serde_json::to_value(status).unwrap(), json!(wire));
            let parsed: TaskStatus = serde_json::from_value(json!(wire)).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_task_deserializes_server_payload() {
        let payload = json!({
            "id": "7f1c9f2e-1111-4c3a-9a55-0d2b1d8f0a01",
            "title": "Write report",
            "description": "Quarterly numbers",
            "status": "TODO",
            "priority": 1,
            "duration_seconds": 3600,
            "deadline": "2026-11-01T17:00:00Z",
            "prerequisite_tasks": ["a", "b"]
        });

        let task: Task = serde_json::from_value(payload).unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.status, Some(TaskStatus::Todo));
        assert_eq!(
            task.deadline,
            Some(Utc.with_ymd_and_hms(2026, 11, 1, 17, 0, 0).unwrap())
        );
        assert_eq!(task.prerequisite_tasks.as_deref().map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_task_tolerates_null_and_missing_fields() {
        let task: Task = serde_json::from_value(json!({
            "id": "1",
            "title": "",
            "deadline": null
        }))
        .unwrap();
        assert!(task.deadline.is_none());
        assert!(task.priority.is_none());
    }

    #[test]
    fn test_update_request_omits_unset_fields() {
        let request = UpdateTaskRequest {
            title: "Renamed".to_string(),
            priority: Some(3),
            ..UpdateTaskRequest::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"title": "Renamed", "priority": 3}));
    }

    #[test]
    fn test_create_request_serializes_deadline_as_rfc3339() {
        let request = CreateTaskRequest::new("t", "d")
            .deadline(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap())
            .prerequisite_tasks(vec!["x".to_string()]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["deadline"], "2026-01-02T03:04:05Z");
        assert_eq!(json["prerequisite_tasks"], json!(["x"]));
        assert_eq!(json["status"], "TODO");
    }
}
