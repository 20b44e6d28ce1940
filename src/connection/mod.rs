//! Connection Module
//!
//! Per-client connection handling. The acceptor (in `main.rs`) spawns one
//! task per accepted connection:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  TCP Listener (main.rs)             │
//! └──────────────────────┬──────────────────────────────┘
//!                        │ accept() + spawn
//!                        ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                   │
//! │                                                     │
//! │   read bytes ──> extract frame ──> SqlExecutor      │
//! │        ▲                                │           │
//! │        └──────── send response <────────┘           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! A handler's failure - frame size limit, write error, peer reset - closes
//! that one connection and nothing else.

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
