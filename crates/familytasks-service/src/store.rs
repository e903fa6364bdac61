//! Task store adapter.
//!
//! Sits between the page controller and a [`TaskService`]: keeps the last
//! fetched collection, turns every mutation into a backend call followed by a
//! full reload, and reports outcomes through a [`Notifier`].

use std::sync::Arc;

use familytasks_core::identity::Identity;
use familytasks_core::notification::{Notification, Notifier};
use familytasks_core::task::{Task, TaskDraft, TaskId};
use thiserror::Error;

use crate::{ServiceError, TaskService};

pub const FETCH_FAILED: &str = "Error fetching tasks";
pub const UPDATE_FAILED: &str = "Error updating task";
pub const SAVE_FAILED: &str = "Error saving task";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("fetching tasks failed: {0}")]
    Fetch(ServiceError),

    #[error("updating task failed: {0}")]
    Update(ServiceError),

    #[error("saving task failed: {0}")]
    Save(ServiceError),
}

impl StoreError {
    pub fn service_error(&self) -> &ServiceError {
        match self {
            StoreError::Fetch(e) | StoreError::Update(e) | StoreError::Save(e) => e,
        }
    }
}

pub struct TaskStore {
    service: Arc<dyn TaskService>,
    notifier: Arc<dyn Notifier>,
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new(service: Arc<dyn TaskService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            tasks: Vec::new(),
        }
    }

    /// Last collection returned by `list`.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub async fn session(&self) -> Result<Identity, ServiceError> {
        self.service.session().await
    }

    /// Fetch the owner's tasks, newest first.
    pub async fn list(&mut self) -> Result<Vec<Task>, StoreError> {
        match self.service.list_tasks().await {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "fetched tasks");
                self.tasks = tasks.clone();
                Ok(tasks)
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetching tasks failed");
                self.tasks.clear();
                self.notify(Notification::error(FETCH_FAILED, e.to_string()));
                Err(StoreError::Fetch(e))
            }
        }
    }

    /// `list`, with a failed fetch rendered as an empty collection.
    pub async fn refresh(&mut self) -> Vec<Task> {
        self.list().await.unwrap_or_default()
    }

    /// Flip `completed` on a task from the last fetched collection. Unknown ids
    /// are ignored. The flag only changes locally once the backend confirmed.
    pub async fn toggle_completion(&mut self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let Some(current) = self.tasks.iter().find(|t| t.id == id) else {
            tracing::debug!(task_id = id, "toggle ignored for unknown task");
            return Ok(None);
        };
        let completed = !current.completed;
        let title = current.title.clone();

        match self.service.set_completed(id, completed).await {
            Ok(task) => {
                tracing::info!(task_id = id, completed, "toggled task");
                self.refresh().await;
                let heading = if completed {
                    "Task completed! 🎉"
                } else {
                    "Task reopened"
                };
                self.notify(Notification::info(heading, title));
                Ok(Some(task))
            }
            Err(e) => {
                tracing::warn!(task_id = id, error = %e, "toggle failed");
                self.notify(Notification::error(UPDATE_FAILED, e.to_string()));
                Err(StoreError::Update(e))
            }
        }
    }

    /// Insert a new task (`draft.id == None`) or replace every editable field
    /// of an existing one.
    pub async fn save(&mut self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let result = match draft.id {
            Some(id) => self.service.update_task(id, &draft.to_update()).await,
            None => self.service.create_task(&draft.to_create()).await,
        };

        match result {
            Ok(task) => {
                tracing::info!(task_id = task.id, created = draft.is_new(), "saved task");
                self.refresh().await;
                let (heading, verb) = if draft.is_new() {
                    ("Task created successfully! 🎉", "assigned")
                } else {
                    ("Task updated successfully! 🎉", "updated")
                };
                self.notify(Notification::info(
                    heading,
                    format!("\"{}\" has been {verb} to {}", task.title, task.assignee),
                ));
                Ok(task)
            }
            Err(e) => {
                tracing::warn!(error = %e, "saving task failed");
                self.notify(Notification::error(SAVE_FAILED, e.to_string()));
                Err(StoreError::Save(e))
            }
        }
    }

    fn notify(&self, notification: Notification) {
        if notification.is_error() {
            tracing::error!(title = %notification.title, description = %notification.description, "notification");
        } else {
            tracing::info!(title = %notification.title, description = %notification.description, "notification");
        }
        self.notifier.notify(notification);
    }
}
