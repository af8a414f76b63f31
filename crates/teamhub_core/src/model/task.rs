//! Task records.
//!
//! # Invariants
//! - Status toggles between exactly two values: `todo` and `completed`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::AccountId;
use super::project::ProjectId;
use super::{non_blank, require_text, ValidationError};

pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    Completed,
}

impl TaskStatus {
    /// Returns the status a toggle moves to.
    pub fn toggled(self) -> Self {
        match self {
            Self::Completed => Self::Todo,
            Self::Todo => Self::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project_id: Option<ProjectId>,
    pub assigned_to: Option<AccountId>,
    pub created_by: AccountId,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Form input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub project_id: Option<ProjectId>,
    pub assigned_to: Option<AccountId>,
    pub due_date: Option<i64>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("task title", &self.title)
    }

    pub fn into_new_task(self, creator: AccountId) -> NewTask {
        NewTask {
            title: self.title.trim().to_string(),
            description: non_blank(self.description),
            status: TaskStatus::Todo,
            priority: self.priority,
            project_id: self.project_id,
            assigned_to: self.assigned_to,
            created_by: creator,
            due_date: self.due_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project_id: Option<ProjectId>,
    pub assigned_to: Option<AccountId>,
    pub created_by: AccountId,
    pub due_date: Option<i64>,
}
