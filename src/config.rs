//! Configuration for Gradebook
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a Gradebook instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the table files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── estudiantes.csv      (student table)
    ///     └── calificaciones.csv   (grade table)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Subject Directory Configuration
    // -------------------------------------------------------------------------
    /// Address of the external subject directory service
    pub directory_addr: String,

    /// Bound on connect and receive for each directory lookup (milliseconds)
    pub directory_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections (0 = unbounded)
    pub max_connections: usize,

    /// Size of the single receive buffer; a request must fit in it
    pub max_request_bytes: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./gradebook_data"),
            directory_addr: "127.0.0.1:12346".to_string(),
            directory_timeout_ms: 3000,
            listen_addr: "127.0.0.1:12345".to_string(),
            max_connections: 1024,
            max_request_bytes: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Directory lookup timeout as a `Duration`
    pub fn directory_timeout(&self) -> Duration {
        Duration::from_millis(self.directory_timeout_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for both tables)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the subject directory address (host:port)
    pub fn directory_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.directory_addr = addr.into();
        self
    }

    /// Set the subject directory timeout (in milliseconds)
    pub fn directory_timeout_ms(mut self, ms: u64) -> Self {
        self.config.directory_timeout_ms = ms;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the receive buffer size (in bytes)
    pub fn max_request_bytes(mut self, bytes: usize) -> Self {
        self.config.max_request_bytes = bytes;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
