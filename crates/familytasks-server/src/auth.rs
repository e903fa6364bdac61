use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use familytasks_core::identity::Identity;
use serde_json::json;
use sha2::{Digest, Sha256};

use familytasks_db::Database;

use crate::routes::AppState;

/// User that `FAMILYTASKS_API_KEY` authenticates as.
pub const ENV_KEY_USER: &str = "family";

/// Authentication configuration.
pub struct AuthConfig {
    /// SHA-256 hash of the `FAMILYTASKS_API_KEY` env var (if set), with the
    /// identity it maps to.
    pub env_key: Option<(String, Identity)>,
    /// Database handle for DB-backed API keys.
    pub db: Arc<dyn Database>,
}

/// SHA-256 hash a raw key, returning the hex-encoded digest.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a new API key: `ft_` + 43 chars of base62-encoded random bytes.
pub fn generate_api_key() -> String {
    use rand::Rng;
    const BASE62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let random_part: String = (0..43)
        .map(|_| BASE62[rng.gen_range(0..BASE62.len())] as char)
        .collect();
    format!("ft_{random_part}")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "missing or invalid API key" })),
    )
        .into_response()
}

/// Resolves the caller's [`Identity`] and stores it in the request extensions.
///
/// With no `AuthConfig` every request acts as the open-access user. Otherwise
/// a valid `Authorization: Bearer <token>` header is required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = match &state.auth {
        Some(auth) => auth,
        None => {
            request.extensions_mut().insert(state.open_identity.clone());
            return next.run(request).await;
        }
    };

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let Some(token) = token else {
        return unauthorized();
    };
    let token_hash = sha256_hex(token);

    if let Some((env_hash, identity)) = &auth.env_key {
        if constant_time_eq(&token_hash, env_hash) {
            request.extensions_mut().insert(identity.clone());
            return next.run(request).await;
        }
    }

    match resolve_db_key(&auth.db, &token_hash).await {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        None => unauthorized(),
    }
}

async fn resolve_db_key(db: &Arc<dyn Database>, token_hash: &str) -> Option<Identity> {
    let api_key = match db.find_api_key_by_hash(token_hash).await {
        Ok(Some(key)) => key,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!(error = %e, "api key lookup failed");
            return None;
        }
    };
    let user = match db.get_user(&api_key.user_id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(key_id = %api_key.id, error = %e, "api key owner missing");
            return None;
        }
    };

    // Fire-and-forget: update last_used_at
    let db = db.clone();
    tokio::spawn(async move {
        if let Err(e) = db.touch_api_key(&api_key.id).await {
            tracing::debug!(error = %e, "touch api key failed");
        }
    });
    Some(Identity::from(&user))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Build an `Option<AuthConfig>` from env + DB state.
///
/// Returns `None` (open access) when neither `FAMILYTASKS_API_KEY` is set
/// nor any DB-backed keys exist.
pub async fn build_auth_config(db: Arc<dyn Database>) -> anyhow::Result<Option<Arc<AuthConfig>>> {
    let env_key = std::env::var("FAMILYTASKS_API_KEY").ok();
    build_auth_config_with_key(db, env_key.as_deref()).await
}

/// Build auth config from an explicit key value (testable without env mutation).
pub async fn build_auth_config_with_key(
    db: Arc<dyn Database>,
    env_key: Option<&str>,
) -> anyhow::Result<Option<Arc<AuthConfig>>> {
    let env_key = match env_key.filter(|k| !k.is_empty()) {
        Some(key) => {
            let user = db.ensure_user(ENV_KEY_USER).await?;
            Some((sha256_hex(key), Identity::from(&user)))
        }
        None => None,
    };

    let has_db_keys = db.has_api_keys().await?;

    if env_key.is_none() && !has_db_keys {
        return Ok(None);
    }

    Ok(Some(Arc::new(AuthConfig { env_key, db })))
}
