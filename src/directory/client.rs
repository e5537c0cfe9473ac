//! Directory Client
//!
//! Opens a fresh connection per call; no pooling.

use std::time::Duration;

use crate::error::{GradebookError, Result};
use crate::network::transport::{is_timeout, round_trip};
use crate::protocol::Response;

use super::{normalize_code, Lookup, Subject, SubjectDirectory};

/// Largest directory reply accepted (64 KB)
const MAX_REPLY_SIZE: u64 = 64 * 1024;

/// TCP client for the subject directory service
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    addr: String,
    timeout: Duration,
}

impl DirectoryClient {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    /// Every subject the directory knows (`LISTAR_NRC`)
    pub fn list_subjects(&self) -> Result<Vec<Subject>> {
        match self.request("LISTAR_NRC")? {
            Response::Ok { data: Some(data), .. } => serde_json::from_value(data)
                .map_err(|e| GradebookError::Dependency(format!("malformed reply: {}", e))),
            Response::Ok { data: None, .. } => Ok(Vec::new()),
            Response::NotFound { message } | Response::Error { message } => {
                Err(GradebookError::Dependency(message))
            }
        }
    }

    /// One exchange; every transport or decoding failure becomes `Dependency`
    fn request(&self, line: &str) -> Result<Response> {
        tracing::trace!("Directory request to {}: {}", self.addr, line);

        round_trip(&self.addr, line.as_bytes(), self.timeout, MAX_REPLY_SIZE).map_err(|e| {
            let reason = match e {
                GradebookError::Io(ref io) if is_timeout(io) => "timeout".to_string(),
                GradebookError::Io(io) => io.to_string(),
                GradebookError::Protocol(reason) => reason,
                other => other.to_string(),
            };
            tracing::warn!("Subject directory {} failed: {}", self.addr, reason);
            GradebookError::Dependency(reason)
        })
    }
}

impl SubjectDirectory for DirectoryClient {
    fn lookup(&self, code: &str) -> Result<Lookup> {
        let code = normalize_code(code);

        match self.request(&format!("BUSCAR_NRC|{}", code))? {
            Response::Ok { data: Some(data), .. } => serde_json::from_value(data)
                .map(Lookup::Found)
                .map_err(|e| GradebookError::Dependency(format!("malformed reply: {}", e))),
            Response::Ok { data: None, .. } => Err(GradebookError::Dependency(
                "malformed reply: missing data".to_string(),
            )),
            Response::NotFound { message } => Ok(Lookup::Unknown(message)),
            Response::Error { message } => Err(GradebookError::Dependency(message)),
        }
    }
}
