pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use familytasks_core::api_key::ApiKey;
use familytasks_core::identity::User;
use familytasks_core::task::{CreateTask, Task, TaskId, UpdateTask};

use crate::{Database, DbConfig, DbError};

/// Converts `rusqlite::Result<T>` into `Result<T, DbError>` so query code can
/// write `.to_db()?`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}

/// Like `to_db`, but an empty result becomes `NotFound(what)`.
pub(crate) fn not_found(what: String) -> impl FnOnce(rusqlite::Error) -> DbError {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(what),
        other => map_sqlite_err(other),
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("familytasks.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.with_conn(migrations::run)?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    /// Run a synchronous query off the async executor.
    async fn blocking<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&SqliteDatabase) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // -- Tasks --
    async fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, DbError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| db.list_tasks_sync(&owner_id)).await
    }
    async fn get_task(&self, owner_id: &str, id: TaskId) -> Result<Task, DbError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| db.get_task_sync(&owner_id, id)).await
    }
    async fn create_task(&self, owner_id: &str, input: &CreateTask) -> Result<Task, DbError> {
        let owner_id = owner_id.to_string();
        let input = input.clone();
        self.blocking(move |db| db.create_task_sync(&owner_id, &input))
            .await
    }
    async fn update_task(
        &self,
        owner_id: &str,
        id: TaskId,
        update: &UpdateTask,
    ) -> Result<Task, DbError> {
        let owner_id = owner_id.to_string();
        let update = update.clone();
        self.blocking(move |db| db.update_task_sync(&owner_id, id, &update))
            .await
    }
    async fn set_task_completed(
        &self,
        owner_id: &str,
        id: TaskId,
        completed: bool,
    ) -> Result<Task, DbError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| db.set_task_completed_sync(&owner_id, id, completed))
            .await
    }

    // -- Users --
    async fn ensure_user(&self, name: &str) -> Result<User, DbError> {
        let name = name.to_string();
        self.blocking(move |db| db.ensure_user_sync(&name)).await
    }
    async fn get_user(&self, id: &str) -> Result<User, DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.get_user_sync(&id)).await
    }

    // -- API Keys --
    async fn insert_api_key(
        &self,
        user_id: &str,
        name: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError> {
        let user_id = user_id.to_string();
        let name = name.to_string();
        let key_hash = key_hash.to_string();
        self.blocking(move |db| db.insert_api_key_sync(&user_id, &name, &key_hash))
            .await
    }
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        let key_hash = key_hash.to_string();
        self.blocking(move |db| db.find_api_key_by_hash_sync(&key_hash))
            .await
    }
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.touch_api_key_sync(&id)).await
    }
    async fn has_api_keys(&self) -> Result<bool, DbError> {
        self.blocking(|db| db.has_api_keys_sync()).await
    }
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        self.blocking(|db| db.list_api_keys_sync()).await
    }
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.delete_api_key_sync(&id)).await
    }
}
