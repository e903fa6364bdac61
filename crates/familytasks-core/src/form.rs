//! Create/edit form controller.
//!
//! Holds the raw field values, validates them synchronously and turns a valid
//! form into a [`TaskDraft`]. Validation failures stay local to the form; they
//! are rendered next to the offending field and never reach the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::{Priority, Task, TaskDraft, TaskId};

pub const FAMILY_MEMBERS: &[&str] = &["Tommy", "Sarah", "Mom", "Dad"];
pub const CATEGORIES: &[&str] = &["Homework", "Chores", "Activities", "Other"];

pub const TITLE_REQUIRED: &str = "Title is required";
pub const ASSIGNEE_REQUIRED: &str = "Please select an assignee";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    pub title: Option<String>,
    pub assignee: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.assignee.is_none()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Title => self.title.as_deref(),
            FormField::Assignee => self.assignee.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("form has invalid fields")]
pub struct ValidationError {
    pub fields: FieldErrors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormField {
    Title,
    Description,
    Assignee,
    Priority,
    Category,
}

impl FormField {
    pub const ORDER: &[FormField] = &[
        FormField::Title,
        FormField::Description,
        FormField::Assignee,
        FormField::Priority,
        FormField::Category,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title *",
            FormField::Description => "Description",
            FormField::Assignee => "Assigned To *",
            FormField::Priority => "Priority",
            FormField::Category => "Category",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FormField::Title | FormField::Description)
    }

    pub fn next(&self) -> FormField {
        let i = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> FormField {
        let i = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub priority: Priority,
    pub category: String,
    errors: FieldErrors,
    editing: Option<(TaskId, bool)>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    /// Empty form for a new task.
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            assignee: String::new(),
            priority: Priority::Medium,
            category: String::new(),
            errors: FieldErrors::default(),
            editing: None,
        }
    }

    /// Form prefilled from an existing task.
    pub fn edit(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            assignee: task.assignee.clone(),
            priority: task.priority,
            category: task.category.clone(),
            errors: FieldErrors::default(),
            editing: Some((task.id, task.completed)),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn validate(&mut self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        if self.title.trim().is_empty() {
            errors.title = Some(TITLE_REQUIRED.to_string());
        }
        if self.assignee.is_empty() {
            errors.assignee = Some(ASSIGNEE_REQUIRED.to_string());
        }
        self.errors = errors.clone();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields: errors })
        }
    }

    /// Validate and build the candidate record. Editing keeps the original
    /// `id` and `completed`; a new task starts incomplete without an id.
    pub fn submit(&mut self) -> Result<TaskDraft, ValidationError> {
        self.validate()?;
        let (id, completed) = match self.editing {
            Some((id, completed)) => (Some(id), completed),
            None => (None, false),
        };
        let description = if self.description.trim().is_empty() {
            None
        } else {
            Some(self.description.clone())
        };
        Ok(TaskDraft {
            id,
            title: self.title.clone(),
            description,
            assignee: self.assignee.clone(),
            priority: self.priority,
            category: self.category.clone(),
            completed,
        })
    }

    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            _ => None,
        }
    }

    /// Step a choice field through its fixed options. `forward == false`
    /// walks backwards. Text fields are left untouched.
    pub fn cycle(&mut self, field: FormField, forward: bool) {
        match field {
            FormField::Assignee => self.assignee = step(FAMILY_MEMBERS, &self.assignee, forward),
            FormField::Category => self.category = step(CATEGORIES, &self.category, forward),
            FormField::Priority => {
                let options: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
                let next = step(&options, self.priority.as_str(), forward);
                self.priority = Priority::parse_str(&next).unwrap_or_default();
            }
            FormField::Title | FormField::Description => {}
        }
    }
}

fn step(options: &[&str], current: &str, forward: bool) -> String {
    if options.is_empty() {
        return current.to_string();
    }
    let next = match options.iter().position(|o| *o == current) {
        Some(i) if forward => (i + 1) % options.len(),
        Some(i) => (i + options.len() - 1) % options.len(),
        None if forward => 0,
        None => options.len() - 1,
    };
    options[next].to_string()
}
