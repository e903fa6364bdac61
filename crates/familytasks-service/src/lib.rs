mod blocking;
mod http;
mod local;
mod store;
mod traits;

pub use blocking::{BlockingHttpService, BlockingTaskStore};
pub use http::HttpService;
pub use local::LocalService;
pub use store::{StoreError, TaskStore};
pub use traits::{ServiceError, TaskService};
