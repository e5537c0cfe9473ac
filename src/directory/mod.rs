//! Subject Directory Module
//!
//! Validation of subject codes against the external directory service.
//!
//! ## Wire Contract
//! ```text
//! BUSCAR_NRC|<CODE>  →  {"status":"ok","data":{"code":..,"name":..}}
//!                    |  {"status":"not_found"|"error","mensaje":..}
//! LISTAR_NRC         →  {"status":"ok","data":[...]}
//! ```
//!
//! Lookups run outside the storage lock: a directory round trip never
//! blocks other clients' storage operations.

mod client;

pub use client::DirectoryClient;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A subject as the directory describes it
///
/// The reference directory names its fields after its own table header
/// (`NRC`, `Materia`); both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(alias = "NRC")]
    pub code: String,

    #[serde(alias = "Materia")]
    pub name: String,
}

/// Answer to a subject lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Subject),

    /// The directory answered `not_found`; carries its message
    Unknown(String),
}

/// Something that can tell whether a subject code exists
///
/// `Err(GradebookError::Dependency(_))` means no usable answer.
pub trait SubjectDirectory: Send + Sync {
    fn lookup(&self, code: &str) -> Result<Lookup>;
}

/// Normalized form of a subject code: trimmed, upper-case
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
