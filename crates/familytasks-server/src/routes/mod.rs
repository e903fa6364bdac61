pub mod health;
pub mod session;
pub mod tasks;

use std::sync::Arc;

use axum::{http::StatusCode, middleware, Json, Router};
use familytasks_core::identity::Identity;
use familytasks_db::Database;
use familytasks_service::{LocalService, ServiceError};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthConfig};

pub struct InnerAppState {
    pub db: Arc<dyn Database>,
    pub auth: Option<Arc<AuthConfig>>,
    pub open_identity: Identity,
}

impl InnerAppState {
    /// Record store acting as `identity`.
    pub fn service_for(&self, identity: Identity) -> LocalService {
        LocalService::new(self.db.clone(), identity)
    }
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new().merge(health::routes());

    let protected = Router::new()
        .merge(session::routes())
        .merge(tasks::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": e.to_string() })))
}
