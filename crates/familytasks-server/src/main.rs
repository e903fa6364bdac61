use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use familytasks_db::{Database, SqliteDatabase};
use tokio::net::TcpListener;

use familytasks_server::auth;
use familytasks_server::config::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db: Arc<dyn Database> = Arc::new(SqliteDatabase::open(&cli.db_config())?);

    match cli.command {
        Some(Commands::Keygen { ref user, ref name }) => {
            let owner = db.ensure_user(user).await?;
            let raw_key = auth::generate_api_key();
            let hash = auth::sha256_hex(&raw_key);
            let api_key = db.insert_api_key(&owner.id, name, &hash).await?;
            eprintln!("Created API key (id: {}) for {}", api_key.id, owner.name);
            if !name.is_empty() {
                eprintln!("  name: {name}");
            }
            // Raw key on stdout so it can be captured
            println!("{raw_key}");
            eprintln!("\nSave this key; it cannot be retrieved again.");
        }
        Some(Commands::ListKeys) => {
            let keys = db.list_api_keys().await?;
            if keys.is_empty() {
                eprintln!("No API keys found.");
            } else {
                println!(
                    "{:<38} {:<16} {:<20} {:<28} LAST USED",
                    "ID", "USER", "NAME", "CREATED"
                );
                for key in keys {
                    let user = db
                        .get_user(&key.user_id)
                        .await
                        .map(|u| u.name)
                        .unwrap_or_else(|_| "?".into());
                    println!(
                        "{:<38} {:<16} {:<20} {:<28} {}",
                        key.id,
                        user,
                        if key.name.is_empty() { "-" } else { &key.name },
                        key.created_at,
                        key.last_used_at.as_deref().unwrap_or("never"),
                    );
                }
            }
        }
        Some(Commands::RevokeKey { ref id }) => {
            db.delete_api_key(id).await?;
            eprintln!("Revoked API key {id}");
        }
        None => {
            let addr = cli.addr();
            let auth = auth::build_auth_config(db.clone()).await?;
            if auth.is_some() {
                tracing::info!("authentication enabled");
            } else {
                tracing::warn!(
                    user = familytasks_server::OPEN_ACCESS_USER,
                    "authentication disabled (no FAMILYTASKS_API_KEY or DB keys)"
                );
            }

            let listener = TcpListener::bind(addr).await?;
            tracing::info!("familytasks-server listening on http://{addr}");

            familytasks_server::serve(listener, db, auth).await?;
        }
    }

    Ok(())
}
