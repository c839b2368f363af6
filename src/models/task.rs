use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::UserId;

string_id!(
    /// Opaque identifier of a task. Clients may choose it on creation.
    TaskId
);

impl TaskId {
    /// Generates a fresh random identifier for tasks created without one.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: TaskId,
    /// Identifier of the user who owns the task. Never serialized to clients.
    #[serde(skip)]
    pub owner: UserId,
    /// The task text. Never empty.
    pub content: String,
    /// Whether the task has been ticked off.
    pub completed: bool,
    /// Creation time; listings are ordered by it.
    pub timestamp: DateTime<Utc>,
}

impl Task {
    /// Creates a new, not yet completed `Task` stamped with the current time.
    pub fn new(id: TaskId, owner: UserId, content: impl Into<String>) -> Self {
        Self {
            id,
            owner,
            content: content.into(),
            completed: false,
            timestamp: Utc::now(),
        }
    }
}

/// Response body of the task listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
}

/// Payload for creating a task. An empty `id` lets the server pick one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTaskRequest {
    pub id: String,
    pub content: String,
}

/// Payload for replacing a task's content.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditTaskRequest {
    pub id: String,
    pub content: String,
}

/// Payload for setting one task's completed flag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskStatusRequest {
    pub id: String,
    pub val: bool,
}

/// Payload for setting the completed flag on every task.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ToggleAllRequest {
    pub val: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new(TaskId::from("t1"), UserId::from("u1"), "buy milk");
        assert_eq!(task.content, "buy milk");
        assert_eq!(task.owner, UserId::from("u1"));
        assert!(!task.completed);
    }

    #[test]
    fn test_owner_is_not_serialized() {
        let task = Task::new(TaskId::from("t1"), UserId::from("secret-owner"), "x");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], "t1");
        assert_eq!(json["completed"], false);
        assert!(json.get("owner").is_none());
        assert!(!json.to_string().contains("secret-owner"));
    }
}
