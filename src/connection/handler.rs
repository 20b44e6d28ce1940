//! Connection Handler Module
//!
//! Each accepted client gets its own handler task that runs a strict
//! request/response cycle until the peer goes away:
//!
//! ```text
//! read bytes -> extract frame -> execute SQL -> encode -> write response
//!      ^                                                       |
//!      └───────────────────────────────────────────────────────┘
//! ```
//!
//! There is no pipelining on the response side: within one connection the
//! Nth response always answers the Nth command. Frames already buffered
//! are drained before the next socket read, so back-to-back messages in a
//! single TCP segment are each answered separately and in order.
//!
//! ## Buffer Management
//!
//! TCP is a stream - a command may arrive split across many reads, or
//! several commands may land in one. Incoming data accumulates in a
//! `BytesMut`; the framing layer extracts one null-terminated command at
//! a time and leftover bytes stay buffered for the next iteration.

use crate::executor::SqlExecutor;
use crate::protocol::{decode_frame, ExecutionResult, FRAME_DELIMITER, MAX_FRAME_SIZE};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, error, info, trace, warn};

/// Initial receive buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Counters shared across all connection handlers.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands executed
    pub commands_processed: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Owns the stream and its receive buffer exclusively; the only shared
/// state is the executor's database handle and the stats counters.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// Executes commands against the shared database
    executor: SqlExecutor,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    /// Creates a new connection handler.
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        executor: SqlExecutor,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            executor,
            stats,
        }
    }

    /// Runs the connection to completion.
    ///
    /// Returns when the peer disconnects or an I/O error occurs; the
    /// stream is dropped (and the socket closed) on every exit path.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    debug!(client = %self.addr, "Client disconnected")
                }
                ConnectionError::IoError(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            // Drain every complete frame already buffered, answering each
            // in arrival order before reading again.
            while let Some(command) = self.next_frame() {
                trace!(client = %self.addr, sql = %command, "Received command");
                let result = self.executor.execute(command).await;
                self.stats.command_processed();
                self.send_response(&result).await?;
            }

            // Need more data - read from the socket
            self.read_more_data().await?;
        }
    }

    /// Extracts the next complete frame from the buffer, if any.
    fn next_frame(&mut self) -> Option<String> {
        let (command, consumed) = decode_frame(&self.buffer)?;
        let _ = self.buffer.split_to(consumed);
        trace!(
            client = %self.addr,
            consumed = consumed,
            remaining = self.buffer.len(),
            "Extracted frame"
        );
        Some(command)
    }

    /// Reads more data from the socket into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        // A buffer at the limit with no delimiter means the peer is
        // streaming garbage; drop the connection.
        if self.buffer.len() >= MAX_FRAME_SIZE {
            error!(
                client = %self.addr,
                size = self.buffer.len(),
                "Frame size limit exceeded"
            );
            return Err(ConnectionError::FrameTooLarge);
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            // Peer closed. With an empty buffer this is the normal end of
            // the connection; with buffered bytes a command was cut short.
            if self.buffer.is_empty() {
                return Err(ConnectionError::ClientDisconnected);
            } else {
                return Err(ConnectionError::UnexpectedEof);
            }
        }

        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Encodes and sends one response, framed with the delimiter.
    ///
    /// The framed response is handed to the stream as a single write so
    /// its bytes are never interleaved with another response's.
    async fn send_response(&mut self, result: &ExecutionResult) -> Result<(), ConnectionError> {
        let mut framed = result.encode().into_bytes();
        framed.push(FRAME_DELIMITER);
        self.stream.write_all(&framed).await?;
        self.stream.flush().await?;
        trace!(
            client = %self.addr,
            bytes = framed.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
///
/// All of these are fatal to the one connection and to nothing else.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Peer closed mid-command (bytes buffered, no delimiter)
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// The peer exceeded the frame size limit without a delimiter
    #[error("Frame size limit exceeded")]
    FrameTooLarge,
}

/// Handles a client connection to completion.
///
/// Convenience wrapper for spawning: creates a [`ConnectionHandler`],
/// runs it, and swallows the expected disconnect outcomes.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    executor: SqlExecutor,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, executor, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}
