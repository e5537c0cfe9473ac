//! Error types for Gradebook
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using GradebookError
pub type Result<T> = std::result::Result<T, GradebookError>;

/// Unified error type for Gradebook operations
#[derive(Debug, Error)]
pub enum GradebookError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// A table file exists but its content cannot be trusted (bad header, bad row)
    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    /// Unknown opcode or wrong field count
    #[error("invalid command")]
    InvalidCommand,

    /// Non-numeric or out-of-range score
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate student or duplicate grade for a subject
    #[error("{0}")]
    Conflict(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    /// Subject directory unreachable, timed out, or replied with garbage
    #[error("subject directory unavailable: {0}")]
    Dependency(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GradebookError {
    /// Whether this error should surface as `not_found` rather than `error`
    pub fn is_not_found(&self) -> bool {
        matches!(self, GradebookError::NotFound(_))
    }
}
