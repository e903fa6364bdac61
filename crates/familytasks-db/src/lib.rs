pub mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use familytasks_core::api_key::ApiKey;
use familytasks_core::identity::User;
use familytasks_core::task::{CreateTask, Task, TaskId, UpdateTask};

pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<familytasks_core::CoreError> for DbError {
    fn from(e: familytasks_core::CoreError) -> Self {
        match e {
            familytasks_core::CoreError::InvalidInput(m) => DbError::InvalidInput(m),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Database file; defaults to `familytasks.db` under [`data_dir`].
    pub sqlite_path: Option<String>,
}

/// Persistence contract. Every task operation is scoped to `owner_id`; rows
/// belonging to another owner behave as if they did not exist.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Tasks --
    async fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, DbError>;
    async fn get_task(&self, owner_id: &str, id: TaskId) -> Result<Task, DbError>;
    async fn create_task(&self, owner_id: &str, input: &CreateTask) -> Result<Task, DbError>;
    async fn update_task(
        &self,
        owner_id: &str,
        id: TaskId,
        update: &UpdateTask,
    ) -> Result<Task, DbError>;
    async fn set_task_completed(
        &self,
        owner_id: &str,
        id: TaskId,
        completed: bool,
    ) -> Result<Task, DbError>;

    // -- Users --
    async fn ensure_user(&self, name: &str) -> Result<User, DbError>;
    async fn get_user(&self, id: &str) -> Result<User, DbError>;

    // -- API Keys --
    async fn insert_api_key(
        &self,
        user_id: &str,
        name: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError>;
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError>;
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError>;
    async fn has_api_keys(&self) -> Result<bool, DbError>;
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError>;
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError>;
}

/// `$XDG_DATA_HOME/familytasks`, falling back to `~/.local/share/familytasks`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("familytasks")
}
