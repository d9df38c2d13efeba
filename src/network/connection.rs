//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::catalog::CatalogService;
use crate::error::{Result, VaultError};
use crate::protocol::{read_command, write_response, Command, Response};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared catalog; the mutex serializes all operations
    service: Arc<Mutex<CatalogService>>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and configures the stream
    pub fn new(stream: TcpStream, service: Arc<Mutex<CatalogService>>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            service,
            peer_addr,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and sends responses.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionAborted => {
                    tracing::debug!("Connection aborted by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::TimedOut => {
                    // Windows reports timeouts as TimedOut instead of WouldBlock
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);

            let response = self.execute_command(command);

            if let Err(e) = self.send_response(response) {
                // Client may vanish between reading the command and writing
                // the response; that is a graceful exit, not a server error.
                if let VaultError::Io(ref io_err) = e {
                    match io_err.kind() {
                        std::io::ErrorKind::ConnectionAborted
                        | std::io::ErrorKind::ConnectionReset
                        | std::io::ErrorKind::BrokenPipe => {
                            tracing::debug!(
                                "Client {} disconnected before response could be sent: {}",
                                self.peer_addr,
                                e
                            );
                            return Ok(());
                        }
                        _ => {}
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a command against the catalog and map the outcome to a wire
    /// response
    fn execute_command(&self, command: Command) -> Response {
        let mut service = self.service.lock();

        let result = match command {
            Command::Create { new } => service.create(new).and_then(|b| Response::beat(&b)),
            Command::GetAll => service.get_all().and_then(|b| Response::beats(&b)),
            Command::GetById { id } => service.get_by_id(&id).and_then(|b| Response::beat(&b)),
            Command::Update { id, patch } => {
                service.update(&id, patch).and_then(|b| Response::beat(&b))
            }
            Command::Delete { id } => service.delete(&id).and_then(|b| Response::beat(&b)),
            Command::Buy { id } => service.buy(&id).and_then(|b| Response::beat(&b)),
            Command::Feature { id } => service.feature(&id).and_then(|b| Response::beat(&b)),
            Command::SearchArtist { query } => service
                .search_by_artist(&query)
                .and_then(|b| Response::beats(&b)),
            Command::SearchTitle { query } => service
                .search_by_title(&query)
                .and_then(|b| Response::beats(&b)),
            Command::Ping => Ok(Response::ok(Some(b"PONG".to_vec()))),
        };

        match result {
            Ok(response) => response,
            Err(VaultError::NotFound) => Response::not_found(),
            Err(VaultError::AlreadySold) => Response::already_sold(),
            Err(e) => Response::error(&e.to_string()),
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
