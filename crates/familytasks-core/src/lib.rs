pub mod api_key;
pub mod error;
pub mod filter;
pub mod form;
pub mod identity;
pub mod notification;
pub mod page;
pub mod task;

pub use api_key::ApiKey;
pub use error::CoreError;
pub use filter::{AssigneeFilter, GroupKey, TaskSelection};
pub use form::{TaskForm, ValidationError};
pub use identity::{Identity, User};
pub use notification::{Notification, Notifier, NotificationLog};
pub use page::{Command, Intent, PageState, Route, View};
pub use task::{CreateTask, Priority, SetCompleted, Task, TaskDraft, TaskId, UpdateTask};
