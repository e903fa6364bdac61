use std::sync::Arc;

use async_trait::async_trait;
use familytasks_core::identity::Identity;
use familytasks_core::task::{CreateTask, Task, TaskId, UpdateTask};
use familytasks_db::{Database, DbError};

use crate::{ServiceError, TaskService};

/// In-process implementation acting as a fixed identity.
pub struct LocalService {
    db: Arc<dyn Database>,
    identity: Identity,
}

impl LocalService {
    pub fn new(db: Arc<dyn Database>, identity: Identity) -> Self {
        Self { db, identity }
    }

    /// Act as the user called `name`, creating it if needed.
    pub async fn for_user(db: Arc<dyn Database>, name: &str) -> Result<Self, ServiceError> {
        let user = db.ensure_user(name).await?;
        Ok(Self::new(db, Identity::from(&user)))
    }

    fn owner(&self) -> &str {
        &self.identity.user_id
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            DbError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

#[async_trait]
impl TaskService for LocalService {
    async fn session(&self) -> Result<Identity, ServiceError> {
        Ok(self.identity.clone())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.db.list_tasks(self.owner()).await?)
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        Ok(self.db.get_task(self.owner(), id).await?)
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        Ok(self.db.create_task(self.owner(), input).await?)
    }

    async fn update_task(&self, id: TaskId, update: &UpdateTask) -> Result<Task, ServiceError> {
        Ok(self.db.update_task(self.owner(), id, update).await?)
    }

    async fn set_completed(&self, id: TaskId, completed: bool) -> Result<Task, ServiceError> {
        Ok(self.db.set_task_completed(self.owner(), id, completed).await?)
    }
}
