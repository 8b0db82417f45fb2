//! User provisioning

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{User, DEFAULT_CATEGORIES};

impl Database {
    /// Look up the user for an identity, creating it (with default categories) on first sight
    pub fn ensure_user(&self, identity: &str) -> Result<User> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(Error::InvalidInput("Identity cannot be empty".to_string()));
        }

        if let Some(user) = self.find_user_by_identity(identity)? {
            return Ok(user);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        // Another connection may have provisioned the same identity meanwhile
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO users (identity) VALUES (?)",
            params![identity],
        )?;

        if inserted > 0 {
            let user_id = tx.last_insert_rowid();
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO categories (user_id, name, icon, color, is_default) VALUES (?, ?, ?, ?, 1)",
                )?;
                for &(name, icon, color) in DEFAULT_CATEGORIES {
                    stmt.execute(params![user_id, name, icon, color])?;
                }
            }
            info!(identity, user_id, "Provisioned user with default categories");
        }
        tx.commit()?;

        self.find_user_by_identity(identity)?
            .ok_or_else(|| Error::NotFound(format!("User '{}'", identity)))
    }

    fn find_user_by_identity(&self, identity: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, identity, created_at FROM users WHERE identity = ?",
                params![identity],
                |row| Self::row_to_user(row),
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, identity, created_at FROM users WHERE id = ?",
                params![id],
                |row| Self::row_to_user(row),
            )
            .optional()?;
        Ok(user)
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, identity, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], |row| Self::row_to_user(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at: String = row.get(2)?;
        Ok(User {
            id: row.get(0)?,
            identity: row.get(1)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
