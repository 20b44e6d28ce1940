//! Embedded Database Engine
//!
//! This module wraps the shared SQLite connection every client drives its
//! commands through. One connection, guarded by a mutex, is the whole
//! concurrency story at this layer: SQLite serializes the statements,
//! autocommits each one on success, and reports contention or constraint
//! violations as ordinary errors that surface to the losing command only.
//!
//! The protocol layer takes no locks of its own and performs no
//! transaction management. Callers get two entry points:
//!
//! - [`Database::query_all`] for statements that produce rows, fetched
//!   eagerly into memory
//! - [`Database::execute`] for everything else
//!
//! The schema is created at open time, idempotently, so a restart against
//! an existing database file is a no-op.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::protocol::Row;

/// Errors reported by the database engine.
///
/// Display renders the underlying SQLite diagnostic verbatim; the protocol
/// layer forwards that text to clients unmodified.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any error surfaced by the SQLite engine.
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// The shared embedded database.
///
/// Holds a single SQLite connection behind a mutex. Cheap to share as
/// `Arc<Database>`; each statement acquires the lock for its duration.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (creating if needed) the database file and initializes the
    /// schema.
    pub fn open(path: &str) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        info!(path = %path, "Database initialized");
        Ok(db)
    }

    /// Opens an in-memory database with the schema applied.
    ///
    /// Used by tests; valid in general because the crate shares exactly
    /// one connection, so the in-memory database is visible to every
    /// client.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Creates the schema if it does not exist and applies migrations.
    fn init_schema(&self) -> Result<(), DbError> {
        let conn = self.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                password TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                login_time TEXT NOT NULL,
                logout_time TEXT,
                FOREIGN KEY(username) REFERENCES users(username)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS file_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                filename TEXT NOT NULL,
                game_channel TEXT,
                upload_time TEXT NOT NULL,
                FOREIGN KEY(username) REFERENCES users(username)
            )",
            [],
        )?;

        // Best-effort migration for databases created before the users
        // table carried a password column. Failure is logged, not fatal.
        if let Err(e) = Self::migrate_users_password(&conn) {
            warn!(error = %e, "users password migration skipped");
        }

        Ok(())
    }

    /// Adds the `password` column to a pre-existing `users` table.
    fn migrate_users_password(conn: &Connection) -> Result<(), DbError> {
        let mut stmt = conn.prepare("PRAGMA table_info(users)")?;
        let mut rows = stmt.query([])?;
        let mut has_password = false;
        while let Some(row) = rows.next()? {
            let name: String = row.get(1)?;
            if name == "password" {
                has_password = true;
                break;
            }
        }
        if !has_password {
            conn.execute("ALTER TABLE users ADD COLUMN password TEXT", [])?;
            conn.execute("UPDATE users SET password = '' WHERE password IS NULL", [])?;
        }
        Ok(())
    }

    /// Executes a non-query statement.
    ///
    /// SQLite runs in autocommit mode, so a successful statement is
    /// durable when this returns; a failed one changes nothing.
    ///
    /// Statements that happen to produce rows anyway (PRAGMA,
    /// `INSERT ... RETURNING`) are stepped to completion with their rows
    /// discarded, so they succeed like any other write.
    pub fn execute(&self, sql: &str) -> Result<(), DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        while rows.next()?.is_some() {}
        Ok(())
    }

    /// Runs a query and fetches the complete result set.
    ///
    /// Rows come back in statement order; each column value is rendered
    /// to text, with SQL NULL mapped to `None`.
    pub fn query_all(&self, sql: &str) -> Result<Vec<Row>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(render_value(row.get_ref(i)?));
            }
            out.push(values);
        }
        Ok(out)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means a panic mid-statement; the connection is
        // still structurally sound, so keep serving.
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Renders one SQLite value to its protocol text form.
fn render_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_tables_exist() {
        let db = Database::open_in_memory().unwrap();
        let rows = db
            .query_all(
                "SELECT name FROM sqlite_master WHERE type = 'table' \
                 AND name IN ('users', 'sessions', 'file_logs') ORDER BY name",
            )
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_schema_init_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.init_schema().unwrap();
    }

    #[test]
    fn test_insert_and_query() {
        let db = Database::open_in_memory().unwrap();
        db.execute("INSERT INTO users (username, password) VALUES ('meni', 'films')")
            .unwrap();
        let rows = db.query_all("SELECT username, password FROM users").unwrap();
        assert_eq!(
            rows,
            vec![vec![Some("meni".to_string()), Some("films".to_string())]]
        );
    }

    #[test]
    fn test_null_column_is_none() {
        let db = Database::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (a INTEGER, b TEXT)").unwrap();
        db.execute("INSERT INTO t VALUES (1, NULL)").unwrap();
        let rows = db.query_all("SELECT a, b FROM t").unwrap();
        assert_eq!(rows, vec![vec![Some("1".to_string()), None]]);
    }

    #[test]
    fn test_missing_table_error_text() {
        let db = Database::open_in_memory().unwrap();
        let err = db.query_all("SELECT * FROM nonexistent").unwrap_err();
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_constraint_violation_is_reported() {
        let db = Database::open_in_memory().unwrap();
        db.execute("INSERT INTO users (username, password) VALUES ('meni', 'x')")
            .unwrap();
        let err = db
            .execute("INSERT INTO users (username, password) VALUES ('meni', 'y')")
            .unwrap_err();
        assert!(err.to_string().to_lowercase().contains("unique"));
    }

    #[test]
    fn test_failed_statement_changes_nothing() {
        let db = Database::open_in_memory().unwrap();
        db.execute("INSERT INTO users (username, password) VALUES ('meni', 'x')")
            .unwrap();
        let _ = db.execute("INSERT INTO users (username) VALUES ('avi')");
        let rows = db.query_all("SELECT COUNT(*) FROM users").unwrap();
        assert_eq!(rows, vec![vec![Some("1".to_string())]]);
    }

    #[test]
    fn test_row_returning_non_select_succeeds() {
        // PRAGMA produces rows but goes down the execute path; the rows
        // are discarded and the statement succeeds.
        let db = Database::open_in_memory().unwrap();
        db.execute("PRAGMA table_info(users)").unwrap();
    }

    #[test]
    fn test_insert_returning_is_applied_and_rows_discarded() {
        let db = Database::open_in_memory().unwrap();
        db.execute(
            "INSERT INTO users (username, password) VALUES ('meni', 'films') RETURNING username",
        )
        .unwrap();
        let rows = db.query_all("SELECT COUNT(*) FROM users").unwrap();
        assert_eq!(rows, vec![vec![Some("1".to_string())]]);
    }

    #[test]
    fn test_empty_result_set() {
        let db = Database::open_in_memory().unwrap();
        let rows = db.query_all("SELECT * FROM users").unwrap();
        assert!(rows.is_empty());
    }
}
