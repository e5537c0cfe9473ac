//! Connection Handler
//!
//! Handles individual client connections.
//!
//! Exactly one request/response cycle per connection:
//! `AwaitingRequest → Dispatching → Responding → Closed`.

use std::io::ErrorKind;
use std::net::TcpStream;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{GradebookError, Result};
use crate::protocol::{read_request, write_response, Response};

/// Handles a single client connection
pub struct Connection {
    stream: TcpStream,

    /// Reference to the dispatcher
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,

    /// Size of the single receive buffer
    max_request_bytes: usize,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, engine: Arc<Engine>, max_request_bytes: usize) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            engine,
            peer_addr,
            max_request_bytes,
        })
    }

    /// Configure connection timeouts; these bound how long an idle peer can
    /// hold the handler
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.stream
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.stream
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection: read one request, dispatch, respond, close
    ///
    /// The stream is closed when `self` drops, on every path.
    pub fn handle(mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let request = match read_request(&mut self.stream, self.max_request_bytes) {
            Ok(Some(request)) => request,
            Ok(None) => {
                // Peer closed before sending anything: no response
                tracing::debug!("Client {} closed without a request", self.peer_addr);
                return Ok(());
            }
            Err(GradebookError::Io(ref e)) if Self::is_disconnect(e.kind()) => {
                tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                return Ok(());
            }
            Err(GradebookError::Io(ref e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                tracing::debug!("Read timeout for client {}", self.peer_addr);
                return Ok(());
            }
            Err(e @ GradebookError::Protocol(_)) => {
                tracing::debug!("Bad request from {}: {}", self.peer_addr, e);
                let _ = self.send_response(&Response::error(e.to_string()));
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                return Err(e);
            }
        };

        tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

        let engine = Arc::clone(&self.engine);
        let response = match panic::catch_unwind(AssertUnwindSafe(|| engine.handle_request(&request))) {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(
                    "Dispatch panicked for {}; closing without response",
                    self.peer_addr
                );
                return Ok(());
            }
        };

        if let Err(e) = self.send_response(&response) {
            // Client gone before the response: not a server error
            if let GradebookError::Io(ref io_err) = e {
                if Self::is_disconnect(io_err.kind()) {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
            }
            tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
            return Err(e);
        }

        tracing::debug!(
            "Answered {} with status {}",
            self.peer_addr,
            response.status().as_str()
        );
        Ok(())
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.stream, response)
    }

    fn is_disconnect(kind: ErrorKind) -> bool {
        matches!(
            kind,
            ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::BrokenPipe
        )
    }
}
