//! SqlRelay - TCP relay for an embedded SQL database
//!
//! This is the main entry point for the SqlRelay server. It sets up
//! logging, opens the shared database, binds the listener, and accepts
//! connections until interrupted.

use anyhow::Context;
use sqlrelay::connection::{handle_connection, ConnectionStats};
use sqlrelay::db::Database;
use sqlrelay::executor::SqlExecutor;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::signal;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Path of the SQLite database file
    db_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: sqlrelay::DEFAULT_HOST.to_string(),
            port: sqlrelay::DEFAULT_PORT,
            db_path: sqlrelay::DEFAULT_DB_PATH.to_string(),
        }
    }
}

impl Config {
    /// Builds the configuration from the command line and environment.
    ///
    /// The single optional positional argument is the listening port.
    /// Unparsable input falls back to the default with a warning rather
    /// than failing startup. `SQLRELAY_DB` overrides the database path.
    fn from_env() -> Self {
        let mut config = Config::default();

        if let Some(raw) = std::env::args().nth(1) {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warn!(
                    "Invalid port '{}', falling back to default {}",
                    raw, config.port
                ),
            }
        }

        if let Ok(path) = std::env::var("SQLRELAY_DB") {
            config.db_path = path;
        }

        config
    }

    /// Returns the bind address.
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let config = Config::from_env();

    info!("SqlRelay v{} starting", sqlrelay::VERSION);

    // Open the shared database; schema creation is idempotent.
    let db = Arc::new(
        Database::open(&config.db_path)
            .with_context(|| format!("failed to open database at '{}'", config.db_path))?,
    );

    let stats = Arc::new(ConnectionStats::new());

    // Bind with address reuse so a quick restart does not fail on
    // "address in use".
    let listener = bind_listener(&config.bind_address())
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!("Listening on {}", config.bind_address());

    // Graceful shutdown: stop accepting on Ctrl+C.
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    tokio::select! {
        _ = accept_loop(listener, db, stats) => {}
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Binds the listening socket with SO_REUSEADDR enabled.
fn bind_listener(bind_address: &str) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = bind_address.parse()?;
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    Ok(socket.listen(1024)?)
}

/// Main loop that accepts incoming connections.
async fn accept_loop(listener: TcpListener, db: Arc<Database>, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                // Each connection gets its own task; acceptance never
                // waits on a connection's lifetime.
                let executor = SqlExecutor::new(Arc::clone(&db));
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, executor, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
