//! Command Execution
//!
//! This module turns one raw command string into one [`ExecutionResult`].
//!
//! Classification is purely syntactic: after trimming whitespace, a
//! command that starts case-insensitively with `SELECT` is a query and
//! gets its full result set fetched; everything else (DML, DDL,
//! malformed input) goes down the execute path. The database reports
//! what it thinks of the statement either way.
//!
//! Execution errors are never fatal - they become
//! [`ExecutionResult::Failed`] carrying the engine's diagnostic text,
//! and the connection keeps serving. SQLite calls are blocking, so they
//! run under `spawn_blocking` to keep the runtime workers free for
//! other connections.

use crate::db::Database;
use crate::protocol::ExecutionResult;
use std::sync::Arc;
use tokio::task;
use tracing::trace;

/// Executes commands against the shared database.
#[derive(Clone)]
pub struct SqlExecutor {
    /// The shared database collaborator
    db: Arc<Database>,
}

impl SqlExecutor {
    /// Creates an executor over the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Executes one command and normalizes the outcome.
    ///
    /// Never returns an error: failures of any kind - engine
    /// diagnostics, or the blocking task failing to join - are folded
    /// into [`ExecutionResult::Failed`].
    pub async fn execute(&self, command: String) -> ExecutionResult {
        let db = Arc::clone(&self.db);
        match task::spawn_blocking(move || run_blocking(&db, &command)).await {
            Ok(result) => result,
            Err(e) => ExecutionResult::failed(format!("execution task failed: {e}")),
        }
    }
}

/// Runs the command on the current (blocking-pool) thread.
fn run_blocking(db: &Database, command: &str) -> ExecutionResult {
    if is_query(command) {
        trace!(sql = %command, "executing query");
        match db.query_all(command) {
            Ok(rows) => ExecutionResult::Rows(rows),
            Err(e) => ExecutionResult::failed(e.to_string()),
        }
    } else {
        trace!(sql = %command, "executing statement");
        match db.execute(command) {
            Ok(()) => ExecutionResult::Done,
            Err(e) => ExecutionResult::failed(e.to_string()),
        }
    }
}

/// Returns true if the command should be executed as a query.
pub fn is_query(command: &str) -> bool {
    let trimmed = command.trim().as_bytes();
    trimmed.len() >= 6 && trimmed[..6].eq_ignore_ascii_case(b"SELECT")
}
