//! Client
//!
//! Sends one command per connection to a Gradebook server.

use std::time::Duration;

use crate::network::transport::round_trip;
use crate::protocol::{encode_command, Command, Response, MAX_RESPONSE_SIZE};

/// Blocking client for the command protocol
#[derive(Debug, Clone)]
pub struct Client {
    addr: String,
    timeout: Duration,
}

impl Client {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    /// Send a command and wait for its response
    pub fn send(&self, command: &Command) -> Response {
        self.send_line(&encode_command(command))
    }

    /// Send a raw request line
    ///
    /// Transport failures are reported locally as an error response; there
    /// is no retry.
    pub fn send_line(&self, line: &str) -> Response {
        round_trip(&self.addr, line.as_bytes(), self.timeout, MAX_RESPONSE_SIZE).unwrap_or_else(|e| {
            tracing::debug!("Request to {} failed: {}", self.addr, e);
            Response::error(format!("connection failed: {}", e))
        })
    }
}
