//! Execution Results and Response Encoding
//!
//! This module defines the normalized outcome of a command and its wire
//! encoding. The response grammar is deliberately simple:
//!
//! - `SUCCESS` - a non-query command succeeded, or a query returned no rows
//! - `SUCCESS|row1|row2|...` - query result; rows are `|`-separated, column
//!   values within a row are `,`-separated, NULL renders as an empty string
//! - `ERROR|<message>` - the engine's diagnostic text, verbatim
//!
//! Two known limitations are part of the wire contract and must not be
//! "fixed" here: an empty result set is indistinguishable from a non-query
//! success, and values or error messages containing `|` or `,` are not
//! escaped.

use std::fmt;

/// Token prefixing every successful response.
pub const SUCCESS: &str = "SUCCESS";

/// Prefix of every failure response.
pub const ERROR_PREFIX: &str = "ERROR|";

/// A row of a query result; `None` marks an SQL NULL.
pub type Row = Vec<Option<String>>;

/// The normalized outcome of executing one command.
///
/// Exactly one `ExecutionResult` is produced per parsed command, and
/// exactly one response is encoded from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// A query ran and its complete result set was fetched.
    ///
    /// An empty vector is a real outcome (a query that matched nothing)
    /// and is distinct from [`ExecutionResult::Done`] at this layer, even
    /// though both encode to the same wire token.
    Rows(Vec<Row>),

    /// A non-query command (insert, update, DDL, ...) succeeded.
    Done,

    /// The engine rejected or failed the command; the message is its
    /// diagnostic text verbatim.
    Failed(String),
}

impl ExecutionResult {
    /// Creates a failure result.
    pub fn failed(msg: impl Into<String>) -> Self {
        ExecutionResult::Failed(msg.into())
    }

    /// Returns true if this result reports a failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, ExecutionResult::Failed(_))
    }

    /// Encodes the result into its wire form.
    ///
    /// The returned string never contains the frame delimiter; the
    /// connection handler appends it exactly once before transmission.
    pub fn encode(&self) -> String {
        match self {
            ExecutionResult::Done => SUCCESS.to_string(),
            ExecutionResult::Rows(rows) if rows.is_empty() => SUCCESS.to_string(),
            ExecutionResult::Rows(rows) => {
                let mut out = String::from(SUCCESS);
                for row in rows {
                    out.push('|');
                    for (i, value) in row.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        if let Some(v) = value {
                            out.push_str(v);
                        }
                    }
                }
                out
            }
            ExecutionResult::Failed(msg) => format!("{ERROR_PREFIX}{msg}"),
        }
    }
}

impl fmt::Display for ExecutionResult {
    /// Displays as the wire encoding, which is what operators see in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
