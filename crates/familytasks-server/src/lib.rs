pub mod auth;
pub mod config;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use familytasks_core::identity::Identity;
use familytasks_db::Database;
use tokio::net::TcpListener;

use auth::AuthConfig;
use routes::InnerAppState;

/// User every request acts as when authentication is disabled.
pub const OPEN_ACCESS_USER: &str = "local";

/// Assemble the router. Creates the open-access user on first use.
pub async fn build_app(db: Arc<dyn Database>, auth: Option<Arc<AuthConfig>>) -> Result<Router> {
    let local = db.ensure_user(OPEN_ACCESS_USER).await?;
    let state = Arc::new(InnerAppState {
        db,
        auth,
        open_identity: Identity::from(&local),
    });
    Ok(routes::build_router(state))
}

pub async fn serve(
    listener: TcpListener,
    db: Arc<dyn Database>,
    auth: Option<Arc<AuthConfig>>,
) -> Result<()> {
    let app = build_app(db, auth).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
