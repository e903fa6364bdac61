use async_trait::async_trait;
use familytasks_core::identity::Identity;
use familytasks_core::task::{CreateTask, Task, TaskId, UpdateTask};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// The record-store contract the task store adapter is written against.
///
/// Every call acts on behalf of one identity: `list_tasks` only returns that
/// identity's tasks and `create_task` attaches it as owner.
/// `LocalService` talks to the database directly, `HttpService` to a running
/// familytasks-server.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn session(&self) -> Result<Identity, ServiceError>;

    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError>;
    async fn get_task(&self, id: TaskId) -> Result<Task, ServiceError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError>;
    async fn update_task(&self, id: TaskId, update: &UpdateTask) -> Result<Task, ServiceError>;
    async fn set_completed(&self, id: TaskId, completed: bool) -> Result<Task, ServiceError>;
}
