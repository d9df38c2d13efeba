//! TCP Server
//!
//! Accepts connections and dispatches each to its own thread. The catalog
//! itself is serialized behind a mutex, so the thread count only affects
//! I/O concurrency, never operation ordering.

use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::catalog::CatalogService;
use crate::config::Config;
use crate::error::Result;

use super::Connection;

/// TCP server for BeatVault
pub struct Server {
    config: Config,
    service: Arc<Mutex<CatalogService>>,
    shutdown: Arc<AtomicBool>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// How often the accept loop checks the shutdown flag
    const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Create a new server with the given config and catalog
    pub fn new(config: Config, service: Arc<Mutex<CatalogService>>) -> Self {
        Self {
            config,
            service,
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start the server (blocking)
    ///
    /// Accepts connections until `shutdown()` is signalled. Each connection
    /// is handled on its own thread, up to `max_connections` at a time.
    pub fn run(&mut self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)?;
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", self.config.listen_addr);

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                tracing::info!("Shutdown signalled, stopping accept loop");
                return Ok(());
            }

            let (stream, addr) = match listener.accept() {
                Ok(accepted) => accepted,
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Self::ACCEPT_POLL_INTERVAL);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };

            if self.active_connections.load(Ordering::Relaxed) >= self.config.max_connections {
                tracing::warn!("Connection limit reached, rejecting {}", addr);
                drop(stream);
                continue;
            }

            self.active_connections.fetch_add(1, Ordering::Relaxed);

            let service = Arc::clone(&self.service);
            let active = Arc::clone(&self.active_connections);
            let read_timeout = self.config.read_timeout_ms;
            let write_timeout = self.config.write_timeout_ms;

            thread::spawn(move || {
                let outcome = Connection::new(stream, service).and_then(|mut conn| {
                    conn.set_timeouts(read_timeout, write_timeout)?;
                    conn.handle()
                });

                if let Err(e) = outcome {
                    tracing::warn!("Connection from {} ended with error: {}", addr, e);
                }

                active.fetch_sub(1, Ordering::Relaxed);
            });
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Handle that can signal shutdown from another thread
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Number of currently active connections
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }
}
