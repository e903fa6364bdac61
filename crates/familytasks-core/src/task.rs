use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Order in which the form offers the choices.
    pub const ALL: &[Priority] = &[Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Priority::High => "!!",
            Priority::Medium => "!",
            Priority::Low => "-",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "High" => Some(Priority::High),
            "Medium" => Some(Priority::Medium),
            "Low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assignee: String,
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub completed: bool,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assignee: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
}

/// Full replacement of every editable field. Completion is carried along so
/// an edit never silently reopens a finished task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assignee: String,
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCompleted {
    pub completed: bool,
}

/// Candidate record produced by the task form.
///
/// `id` is `None` for a brand new task; the backend assigns one on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub id: Option<TaskId>,
    pub title: String,
    pub description: Option<String>,
    pub assignee: String,
    pub priority: Priority,
    pub category: String,
    pub completed: bool,
}

impl TaskDraft {
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn to_create(&self) -> CreateTask {
        CreateTask {
            title: self.title.clone(),
            description: self.description.clone(),
            assignee: self.assignee.clone(),
            priority: self.priority,
            category: self.category.clone(),
        }
    }

    pub fn to_update(&self) -> UpdateTask {
        UpdateTask {
            title: self.title.clone(),
            description: self.description.clone(),
            assignee: self.assignee.clone(),
            priority: self.priority,
            category: self.category.clone(),
            completed: self.completed,
        }
    }
}

impl CreateTask {
    /// Rejects records without a title or an assignee.
    pub fn validate(&self) -> Result<(), crate::CoreError> {
        check_title(&self.title)?;
        check_assignee(&self.assignee)
    }
}

impl UpdateTask {
    pub fn validate(&self) -> Result<(), crate::CoreError> {
        check_title(&self.title)?;
        check_assignee(&self.assignee)
    }
}

fn check_title(title: &str) -> Result<(), crate::CoreError> {
    if title.trim().is_empty() {
        return Err(crate::CoreError::InvalidInput("title must not be empty".into()));
    }
    Ok(())
}

fn check_assignee(assignee: &str) -> Result<(), crate::CoreError> {
    if assignee.trim().is_empty() {
        return Err(crate::CoreError::InvalidInput("assignee must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn task(id: TaskId, title: &str, assignee: &str, category: &str) -> Task {
        let now = Utc::now();
        Task {
            id,
            title: title.to_string(),
            description: None,
            assignee: assignee.to_string(),
            priority: Priority::Medium,
            category: category.to_string(),
            completed: false,
            owner_id: "owner".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
