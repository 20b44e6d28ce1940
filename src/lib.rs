//! # SqlRelay - A TCP Relay for an Embedded SQL Database
//!
//! SqlRelay accepts TCP connections, reads null-terminated SQL text
//! commands, executes them against a shared embedded SQLite database, and
//! answers each command with a null-terminated delimited text response.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                           SqlRelay                             │
//! │                                                                │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐         │
//! │  │ TCP Server  │───>│ Connection  │───>│    Sql      │         │
//! │  │ (Listener)  │    │  Handler    │    │  Executor   │         │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘         │
//! │                                               │                │
//! │  ┌─────────────┐                              ▼                │
//! │  │   Frame     │                   ┌───────────────────┐       │
//! │  │  Decoder    │                   │     Database      │       │
//! │  │ (0x00 delim)│                   │ (SQLite, shared)  │       │
//! │  └─────────────┘                   └───────────────────┘       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Protocol
//!
//! - Request: UTF-8 SQL text terminated by one null byte (0x00)
//! - Response: `SUCCESS`, `SUCCESS|row1|row2|...` (columns comma-joined,
//!   NULL as empty string), or `ERROR|<message>` - likewise terminated by
//!   one null byte
//!
//! Within one connection the Nth response answers the Nth command, in
//! order. Across connections no ordering is guaranteed; SQLite alone
//! serializes concurrent writers.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sqlrelay::connection::{handle_connection, ConnectionStats};
//! use sqlrelay::db::Database;
//! use sqlrelay::executor::SqlExecutor;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let db = Arc::new(Database::open("sqlrelay.db").unwrap());
//!     let stats = Arc::new(ConnectionStats::new());
//!     let listener = TcpListener::bind("127.0.0.1:7778").await.unwrap();
//!
//!     loop {
//!         let (stream, addr) = listener.accept().await.unwrap();
//!         let executor = SqlExecutor::new(Arc::clone(&db));
//!         let stats = Arc::clone(&stats);
//!         tokio::spawn(handle_connection(stream, addr, executor, stats));
//!     }
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: null-delimited framing and response encoding
//! - [`db`]: the shared embedded SQLite engine
//! - [`executor`]: command classification and execution
//! - [`connection`]: per-client connection handling
//!
//! ## Concurrency Model
//!
//! One tokio task per connection; the acceptor never waits on any
//! connection's lifetime. The database is the only shared resource: a
//! single SQLite connection behind a mutex, driven through
//! `spawn_blocking` so statements never stall the runtime workers. The
//! protocol layer takes no locks of its own - write/write contention
//! surfaces as an `ERROR|...` response to the losing command, never as a
//! process fault.

pub mod connection;
pub mod db;
pub mod executor;
pub mod protocol;

// Re-export commonly used types for convenience
pub use connection::{handle_connection, ConnectionStats};
pub use db::{Database, DbError};
pub use executor::SqlExecutor;
pub use protocol::{decode_frame, ExecutionResult};

/// The default port SqlRelay listens on
pub const DEFAULT_PORT: u16 = 7778;

/// The default host SqlRelay binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default database file path
pub const DEFAULT_DB_PATH: &str = "sqlrelay.db";

/// Version of SqlRelay
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
