//! Database Module
//!
//! The embedded SQLite engine shared by every connection. The protocol
//! layer treats it as a collaborator: raw statement text in, rows or an
//! error out, one autocommitted statement at a time.

pub mod engine;

// Re-export commonly used types
pub use engine::{Database, DbError};
