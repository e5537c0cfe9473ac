//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{GradebookError, Result};
use crate::protocol::{write_response, Response};

use super::Connection;

/// How often the accept loop checks the shutdown flag when idle
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Write bound for the "server busy" rejection
const REJECT_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// TCP server for Gradebook
///
/// One thread per accepted connection. `max_connections` caps how many
/// handlers run at once; past the cap a connection gets a `server busy`
/// error and is closed.
pub struct Server {
    config: Config,
    engine: Arc<Engine>,

    /// Taken by `run` and dropped when it returns, which closes the socket
    listener: Mutex<Option<TcpListener>>,

    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,

    /// Handlers currently in flight
    active: Arc<AtomicUsize>,

    next_connection_id: AtomicU64,
}

impl Server {
    /// Bind the listening socket
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        if config.max_request_bytes == 0 {
            return Err(GradebookError::Config(
                "max_request_bytes must be positive".to_string(),
            ));
        }

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking so the loop can notice shutdown between accepts
        listener.set_nonblocking(true)?;

        let local_addr = listener.local_addr()?;
        tracing::info!("Listening on {}", local_addr);

        Ok(Self {
            config,
            engine,
            listener: Mutex::new(Some(listener)),
            local_addr,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
            next_connection_id: AtomicU64::new(1),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.local_addr)
    }

    /// Run the accept loop until shutdown is signalled (blocking)
    ///
    /// The listening socket is closed when this returns, so later connects
    /// are refused. Handlers already running are not waited for; they finish
    /// on their own. A server runs at most once.
    pub fn run(&self) -> Result<()> {
        let listener = self.listener.lock().take().ok_or_else(|| {
            GradebookError::Config("server already ran; bind a new one".to_string())
        })?;

        while !self.shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        drop(listener);
        tracing::info!(
            "Stopped accepting on {}; {} handler(s) still in flight",
            self.local_addr,
            self.active_connections()
        );
        Ok(())
    }

    /// Signal the server to stop accepting
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Flag that stops the accept loop when set (for signal handlers)
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Number of handlers currently running
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        // Accepted sockets may inherit non-blocking mode on some platforms
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping {}: {}", peer, e);
            return;
        }

        let Some(permit) = ConnectionPermit::acquire(&self.active, self.config.max_connections) else {
            tracing::warn!("Rejecting {}: {} handlers busy", peer, self.config.max_connections);
            Self::reject(stream);
            return;
        };

        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let engine = Arc::clone(&self.engine);
        let max_request_bytes = self.config.max_request_bytes;
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                let _permit = permit;
                let result = Connection::new(stream, engine, max_request_bytes).and_then(|mut conn| {
                    conn.set_timeouts(read_ms, write_ms)?;
                    conn.handle()
                });
                if let Err(e) = result {
                    tracing::warn!("Connection {} from {} failed: {}", id, peer, e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn handler for {}: {}", peer, e);
        }
    }

    fn reject(mut stream: TcpStream) {
        let _ = stream.set_write_timeout(Some(REJECT_WRITE_TIMEOUT));
        let _ = write_response(&mut stream, &Response::error("server busy"));
    }
}

/// Slot in the admission gate, released on drop
struct ConnectionPermit {
    active: Arc<AtomicUsize>,
}

impl ConnectionPermit {
    /// Take a slot, or `None` if `limit` handlers are running (0 = no limit)
    fn acquire(active: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        let previous = active.fetch_add(1, Ordering::SeqCst);
        if limit > 0 && previous >= limit {
            active.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(Self {
            active: Arc::clone(active),
        })
    }
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
