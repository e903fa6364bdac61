use std::net::{IpAddr, SocketAddr};

use clap::{Parser, Subcommand};
use familytasks_db::DbConfig;

#[derive(Debug, Parser)]
#[command(name = "familytasks-server", about = "Family Tasks REST server")]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "FAMILYTASKS_BIND", default_value = "0.0.0.0", global = true)]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "FAMILYTASKS_PORT", default_value_t = 3720, global = true)]
    pub port: u16,

    /// SQLite database file (defaults to the XDG data dir)
    #[arg(long, env = "FAMILYTASKS_DB", global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new API key for a user
    Keygen {
        /// User the key authenticates as; created if missing
        #[arg(long)]
        user: String,
        /// Human-readable name for the key
        #[arg(long, default_value = "")]
        name: String,
    },
    /// List all API keys (metadata only, no secrets)
    ListKeys,
    /// Revoke (delete) an API key by ID
    RevokeKey {
        /// The API key ID to revoke
        id: String,
    },
}

impl Cli {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            sqlite_path: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let cli = Cli::try_parse_from(["familytasks-server"]).unwrap();
        assert_eq!(cli.addr().port(), 3720);
        assert!(cli.addr().ip().is_unspecified());
        assert!(cli.command.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "familytasks-server",
            "--bind",
            "127.0.0.1",
            "--port",
            "8080",
            "--db",
            "/tmp/tasks.db",
        ])
        .unwrap();
        assert_eq!(cli.addr().to_string(), "127.0.0.1:8080");
        assert_eq!(cli.db_config().sqlite_path.as_deref(), Some("/tmp/tasks.db"));
    }

    #[test]
    fn keygen_requires_user() {
        assert!(Cli::try_parse_from(["familytasks-server", "keygen"]).is_err());
        let cli = Cli::try_parse_from(["familytasks-server", "keygen", "--user", "Dad"]).unwrap();
        match cli.command {
            Some(Commands::Keygen { user, name }) => {
                assert_eq!(user, "Dad");
                assert!(name.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
