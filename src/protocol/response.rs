//! Response definitions
//!
//! Represents responses to clients. The same shape is spoken by the subject
//! directory, so this type also decodes its replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    Error,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::NotFound => "not_found",
            Status::Error => "error",
        }
    }
}

/// A response to send to a client
///
/// Serialized as a JSON object tagged by `status`:
/// `{"status":"ok","mensaje":"..."}`, `{"status":"ok","data":[...]}`,
/// `{"status":"not_found","mensaje":"..."}`, `{"status":"error","mensaje":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok {
        #[serde(rename = "mensaje", default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    NotFound {
        #[serde(rename = "mensaje", default)]
        message: String,
    },
    Error {
        #[serde(rename = "mensaje", default)]
        message: String,
    },
}

impl Response {
    /// Create an OK response carrying a message
    pub fn ok(message: impl Into<String>) -> Self {
        Response::Ok {
            message: Some(message.into()),
            data: None,
        }
    }

    /// Create an OK response carrying data
    pub fn ok_data(data: Value) -> Self {
        Response::Ok {
            message: None,
            data: Some(data),
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found(message: impl Into<String>) -> Self {
        Response::NotFound {
            message: message.into(),
        }
    }

    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Response::Ok { .. } => Status::Ok,
            Response::NotFound { .. } => Status::NotFound,
            Response::Error { .. } => Status::Error,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status() == Status::Ok
    }

    /// The `mensaje` field, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Response::Ok { message, .. } => message.as_deref(),
            Response::NotFound { message } | Response::Error { message } => Some(message),
        }
    }

    /// The `data` field, if any
    pub fn data(&self) -> Option<&Value> {
        match self {
            Response::Ok { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}
