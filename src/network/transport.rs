//! One-shot request/response exchange
//!
//! Client side of the protocol: connect, send one message, read the reply
//! until the peer closes. Used by both the command client and the subject
//! directory client.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::protocol::{read_response, Response};

/// Send `request` to `addr` and decode the single response
///
/// `timeout` bounds the whole exchange, connect through the last byte of the
/// reply; a zero timeout means no bound. A peer that keeps trickling bytes
/// past the deadline fails with `TimedOut`.
pub fn round_trip(addr: &str, request: &[u8], timeout: Duration, limit: u64) -> Result<Response> {
    let timeout = (!timeout.is_zero()).then_some(timeout);
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut stream = connect(addr, timeout)?;

    stream.set_write_timeout(timeout)?;
    stream.set_nodelay(true)?;

    stream.write_all(request)?;
    stream.flush()?;
    // Nothing more to send; the reply is read until the server closes
    let _ = stream.shutdown(Shutdown::Write);

    read_response(&mut DeadlineReader::new(&stream, deadline), limit)
}

/// Reads from a stream, shrinking the read timeout so the sum of all reads
/// stays within `deadline`
struct DeadlineReader<'a> {
    stream: &'a TcpStream,
    deadline: Option<Instant>,
}

impl<'a> DeadlineReader<'a> {
    fn new(stream: &'a TcpStream, deadline: Option<Instant>) -> Self {
        Self { stream, deadline }
    }
}

impl Read for DeadlineReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(deadline) = self.deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "response deadline exceeded",
                ));
            }
            self.stream.set_read_timeout(Some(remaining))?;
        }
        let mut stream = self.stream;
        stream.read(buf)
    }
}

/// Whether an I/O error is a timeout (Unix reports `WouldBlock`, Windows `TimedOut`)
pub fn is_timeout(error: &io::Error) -> bool {
    matches!(error.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

fn connect(addr: &str, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let mut last_error = None;

    for socket_addr in addr.to_socket_addrs()? {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&socket_addr, timeout),
            None => TcpStream::connect(socket_addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} did not resolve to any address", addr),
        )
    }))
}
