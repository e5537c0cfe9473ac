//! # Gradebook
//!
//! A minimal academic record server:
//! - Pipe-delimited text commands over TCP, one per connection
//! - Students and grades persisted in flat CSV tables
//! - Grade submissions validated against an external subject directory
//! - Thread-per-connection with one exclusive region over storage
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (one thread per connection)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  OPCODE|FIELD|...
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Command Parser + Dispatcher                     │
//! │                      (Engine)                                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌───────────────────┐
//!   │   Storage   │          │ Subject Directory │
//!   │ (one Mutex) │          │  (remote, no lock)│
//!   └──────┬──────┘          └───────────────────┘
//!          │
//!          ▼
//!   estudiantes.csv / calificaciones.csv
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod directory;
pub mod network;
pub mod protocol;
pub mod engine;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{GradebookError, Result};
pub use config::Config;
pub use engine::Engine;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Gradebook
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
