use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use axum::Router;
use familytasks_db::{Database, SqliteDatabase};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::auth::{generate_api_key, sha256_hex, AuthConfig};

/// Router over in-memory SQLite with auth disabled.
pub async fn test_router() -> Router {
    let db: Arc<dyn Database> = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    crate::build_app(db, None).await.unwrap()
}

/// Router with auth enabled and one DB key owned by `user`; returns
/// (router, raw key).
pub async fn test_router_with_auth(user: &str) -> (Router, String) {
    let db: Arc<dyn Database> = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    let api_key = issue_key(&db, user).await;
    let auth = Arc::new(AuthConfig {
        env_key: None,
        db: db.clone(),
    });
    (crate::build_app(db, Some(auth)).await.unwrap(), api_key)
}

/// Create a DB-backed key for `user`, returning the raw key.
pub async fn issue_key(db: &Arc<dyn Database>, user: &str) -> String {
    let owner = db.ensure_user(user).await.unwrap();
    let raw = generate_api_key();
    db.insert_api_key(&owner.id, "test", &sha256_hex(&raw))
        .await
        .unwrap();
    raw
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn json_body(value: Value) -> Body {
    Body::from(value.to_string())
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    pub db: Arc<dyn Database>,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an open-access server on a random port.
pub async fn spawn_test_server() -> TestServer {
    let db: Arc<dyn Database> = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    spawn_with(db, None).await
}

/// Spawn a server requiring API keys. Mint keys with [`issue_key`] on the
/// returned `db`.
pub async fn spawn_test_server_with_auth() -> TestServer {
    let db: Arc<dyn Database> = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    let auth = Arc::new(AuthConfig {
        env_key: None,
        db: db.clone(),
    });
    spawn_with(db, Some(auth)).await
}

async fn spawn_with(db: Arc<dyn Database>, auth: Option<Arc<AuthConfig>>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = crate::build_app(db.clone(), auth).await.unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{addr}"),
        db,
        _handle: handle,
    }
}
