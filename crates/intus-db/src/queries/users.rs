use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;
use crate::models::UserRow;

const USER_COLUMNS: &str = "id, email, name, password_hash, created_at, updated_at";

impl Database {
    // -- Users --

    /// Insert a user. The email is expected to be normalized already; the
    /// column is `COLLATE NOCASE`, so case variants still collide.
    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<UserRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO users (id, email, name, password_hash, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                     RETURNING {USER_COLUMNS}"
                ),
                rusqlite::params![id, email, name, password_hash, now],
                user_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    pub fn user_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM users WHERE id = ?1)",
                [id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    /// Update display name and/or email in one statement. Returns `None` when
    /// no user has this id.
    pub fn update_user_profile(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "UPDATE users
                         SET name = COALESCE(?2, name),
                             email = COALESCE(?3, email),
                             updated_at = ?4
                         WHERE id = ?1
                         RETURNING {USER_COLUMNS}"
                    ),
                    rusqlite::params![id, name, email, now],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }
}

fn query_user(conn: &Connection, predicate: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}"))?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
