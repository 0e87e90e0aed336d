use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents a task entity as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The name of the task.
    pub name: String,
    /// Free-form due date, stored as given.
    pub due_date: String,
    /// Identifier of the user who created the task.
    pub owner: Uuid,
    /// Users granted the same access as the owner.
    pub shared_to: Vec<Uuid>,
}

/// Input structure for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 64))]
    pub due_date: String,
}

/// Partial update applied by `PUT /tasks/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub due_date: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.due_date.is_none()
    }

    /// Applies the present fields to `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = due_date.clone();
        }
    }
}

/// Fields needed to persist a new task. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub due_date: String,
    pub owner: Uuid,
}

impl NewTask {
    pub fn new(input: TaskInput, owner: Uuid) -> Self {
        Self {
            name: input.name,
            due_date: input.due_date,
            owner,
        }
    }
}

/// Body of `POST /tasks/{id}/share`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRequest {
    pub username: String,
}
