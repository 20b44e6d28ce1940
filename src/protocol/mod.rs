//! Wire Protocol Implementation
//!
//! The protocol is a flat request/response exchange over TCP:
//!
//! - Request: UTF-8 SQL text terminated by one null byte (0x00)
//! - Response: UTF-8 text terminated by one null byte
//!
//! Response grammar:
//!
//! ```text
//! SUCCESS                     command succeeded (or query matched no rows)
//! SUCCESS|row1|row2|...       query result, rows comma-joined internally
//! ERROR|<message>             engine diagnostic, verbatim
//! ```
//!
//! ## Modules
//!
//! - `framing`: extracts null-delimited frames from a byte stream
//! - `types`: the `ExecutionResult` outcome and its response encoding
//!
//! ## Example
//!
//! ```
//! use sqlrelay::protocol::{decode_frame, ExecutionResult};
//!
//! let buf = b"SELECT 1\0trailing";
//! let (command, consumed) = decode_frame(buf).unwrap();
//! assert_eq!(command, "SELECT 1");
//! assert_eq!(&buf[consumed..], b"trailing");
//!
//! let response = ExecutionResult::Rows(vec![vec![Some("1".to_string())]]);
//! assert_eq!(response.encode(), "SUCCESS|1");
//! ```

pub mod framing;
pub mod types;

// Re-export commonly used items for convenience
pub use framing::{decode_frame, FRAME_DELIMITER, MAX_FRAME_SIZE};
pub use types::{ExecutionResult, Row, ERROR_PREFIX, SUCCESS};
