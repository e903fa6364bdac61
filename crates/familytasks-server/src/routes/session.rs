use axum::{routing::get, Extension, Json, Router};
use familytasks_core::identity::Identity;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/session", get(session))
}

/// The identity the bearer key (or open access) resolved to.
async fn session(Extension(identity): Extension<Identity>) -> Json<Identity> {
    Json(identity)
}
