use std::sync::Arc;

use familytasks_core::identity::Identity;
use familytasks_core::notification::Notifier;
use familytasks_core::task::{Task, TaskDraft, TaskId};
use tokio::runtime::Runtime;

use crate::{HttpService, ServiceError, StoreError, TaskService, TaskStore};

/// Blocking wrapper around the async `HttpService` for probing a server
/// before the UI starts.
pub struct BlockingHttpService {
    inner: HttpService,
    rt: Runtime,
}

impl BlockingHttpService {
    pub fn new(base_url: &str) -> std::io::Result<Self> {
        Ok(Self {
            inner: HttpService::new(base_url),
            rt: Runtime::new()?,
        })
    }

    pub fn health_check(&self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.health_check())
    }

    pub fn session(&self) -> Result<Identity, ServiceError> {
        self.rt.block_on(self.inner.session())
    }
}

/// Drives a [`TaskStore`] from synchronous code.
///
/// Owns its own tokio runtime and uses `block_on()` for each call. Must not be
/// used from inside another runtime.
pub struct BlockingTaskStore {
    inner: TaskStore,
    rt: Runtime,
}

impl BlockingTaskStore {
    pub fn new(
        service: Arc<dyn TaskService>,
        notifier: Arc<dyn Notifier>,
    ) -> std::io::Result<Self> {
        Ok(Self {
            inner: TaskStore::new(service, notifier),
            rt: Runtime::new()?,
        })
    }

    /// Store talking to a familytasks-server over HTTP.
    pub fn http(
        base_url: &str,
        api_key: Option<String>,
        notifier: Arc<dyn Notifier>,
    ) -> std::io::Result<Self> {
        let service = match api_key {
            Some(key) => HttpService::with_api_key(base_url, key),
            None => HttpService::new(base_url),
        };
        Self::new(Arc::new(service), notifier)
    }

    pub fn tasks(&self) -> &[Task] {
        self.inner.tasks()
    }

    pub fn session(&self) -> Result<Identity, ServiceError> {
        self.rt.block_on(self.inner.session())
    }

    pub fn list(&mut self) -> Result<Vec<Task>, StoreError> {
        self.rt.block_on(self.inner.list())
    }

    pub fn refresh(&mut self) -> Vec<Task> {
        self.rt.block_on(self.inner.refresh())
    }

    pub fn toggle_completion(&mut self, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.rt.block_on(self.inner.toggle_completion(id))
    }

    pub fn save(&mut self, draft: &TaskDraft) -> Result<Task, StoreError> {
        self.rt.block_on(self.inner.save(draft))
    }
}
