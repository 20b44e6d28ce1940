//! Executor Module
//!
//! The layer between the wire protocol and the database: takes one raw
//! command string, classifies it (query vs. everything else), runs it on
//! the blocking pool, and folds every outcome into an `ExecutionResult`
//! that the protocol layer can encode.

pub mod handler;

// Re-export the main executor type
pub use handler::{is_query, SqlExecutor};
