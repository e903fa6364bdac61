use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use familytasks_core::identity::User;

use super::super::{not_found, SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

impl SqliteDatabase {
    /// Look up a user by name, creating it on first use.
    pub fn ensure_user_sync(&self, name: &str) -> Result<User, DbError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DbError::InvalidInput("user name must not be empty".into()));
        }
        self.with_conn(|conn| {
            let existing = conn
                .query_row(
                    "SELECT * FROM users WHERE name = ?1",
                    params![name],
                    row_to_user,
                )
                .optional()
                .to_db()?;
            if let Some(user) = existing {
                return Ok(user);
            }

            let id = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO users (id, name, created_at) VALUES (?1, ?2, ?3)",
                params![id, name, Utc::now()],
            )
            .to_db()?;
            tracing::info!(user_id = %id, name, "created user");
            conn.query_row("SELECT * FROM users WHERE id = ?1", params![id], row_to_user)
                .to_db()
        })
    }

    pub fn get_user_sync(&self, id: &str) -> Result<User, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM users WHERE id = ?1", params![id], row_to_user)
                .map_err(not_found(format!("user {id}")))
        })
    }

    pub fn count_users_sync(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
                .to_db()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_user_is_idempotent() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let first = db.ensure_user_sync("family").unwrap();
        let second = db.ensure_user_sync("family").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(db.count_users_sync().unwrap(), 1);

        let fetched = db.get_user_sync(&first.id).unwrap();
        assert_eq!(fetched.name, "family");
    }

    #[test]
    fn blank_name_is_rejected() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        assert!(matches!(
            db.ensure_user_sync("  "),
            Err(DbError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        assert!(matches!(
            db.get_user_sync("nope"),
            Err(DbError::NotFound(_))
        ));
    }
}
