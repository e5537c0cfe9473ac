//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! OPCODE|FIELD|FIELD...
//! ```
//! One text message per connection, no length prefix. The whole request must
//! fit in the server's receive buffer and arrive in a single read. Fields
//! cannot contain `|`; there is no escaping.
//!
//! ### Response
//! One UTF-8 JSON object, then the server closes the connection.

use std::io::{ErrorKind, Read, Write};

use crate::error::{GradebookError, Result};
use super::{Command, CommandType, Response};

/// Separator between opcode and fields
pub const FIELD_SEPARATOR: char = '|';

/// Largest response a client will buffer (16 MB)
pub const MAX_RESPONSE_SIZE: u64 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Parse a raw request line into a command
///
/// Surrounding whitespace is ignored on the line and on each field. Any
/// unknown opcode, wrong field count, or empty field is `InvalidCommand`.
/// Pure: never touches storage.
pub fn parse_command(line: &str) -> Result<Command> {
    let parts: Vec<&str> = line.trim().split(FIELD_SEPARATOR).map(str::trim).collect();
    let (opcode, fields) = parts
        .split_first()
        .ok_or(GradebookError::InvalidCommand)?;

    let command_type =
        CommandType::from_opcode(opcode).ok_or(GradebookError::InvalidCommand)?;

    if fields.iter().any(|field| field.is_empty()) {
        return Err(GradebookError::InvalidCommand);
    }

    let command = match (command_type, fields) {
        (CommandType::RegisterStudent, [id, name]) => Command::RegisterStudent {
            id: id.to_string(),
            name: name.to_string(),
        },
        (CommandType::AddGrade, [student_id, subject, score]) => Command::AddGrade {
            student_id: student_id.to_string(),
            subject: subject.to_string(),
            score: score.to_string(),
        },
        (CommandType::FindGrades, [student_id]) => Command::FindGrades {
            student_id: student_id.to_string(),
        },
        (CommandType::UpdateGrade, [student_id, subject, score]) => Command::UpdateGrade {
            student_id: student_id.to_string(),
            subject: Some(subject.to_string()),
            score: score.to_string(),
        },
        (CommandType::UpdateGrade, [student_id, score]) => Command::UpdateGrade {
            student_id: student_id.to_string(),
            subject: None,
            score: score.to_string(),
        },
        (CommandType::ListGrades, []) => Command::ListGrades,
        (CommandType::DeleteGrades, [student_id]) => Command::DeleteGrades {
            student_id: student_id.to_string(),
        },
        _ => return Err(GradebookError::InvalidCommand),
    };

    Ok(command)
}

/// Encode a command as a request line
pub fn encode_command(command: &Command) -> String {
    let fields: Vec<&str> = match command {
        Command::RegisterStudent { id, name } => vec![id.as_str(), name.as_str()],
        Command::AddGrade {
            student_id,
            subject,
            score,
        } => vec![student_id.as_str(), subject.as_str(), score.as_str()],
        Command::FindGrades { student_id } => vec![student_id.as_str()],
        Command::UpdateGrade {
            student_id,
            subject,
            score,
        } => match subject {
            Some(subject) => vec![student_id.as_str(), subject.as_str(), score.as_str()],
            None => vec![student_id.as_str(), score.as_str()],
        },
        Command::ListGrades => vec![],
        Command::DeleteGrades { student_id } => vec![student_id.as_str()],
    };

    let mut line = command.command_type().opcode().to_string();
    for field in fields {
        line.push(FIELD_SEPARATOR);
        line.push_str(field);
    }
    line
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    serde_json::to_vec(response)
        .map_err(|e| GradebookError::Protocol(format!("cannot encode response: {}", e)))
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    serde_json::from_slice(bytes)
        .map_err(|e| GradebookError::Protocol(format!("malformed response: {}", e)))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one request with a single read of at most `max_bytes`
///
/// Returns `None` when the peer closed without sending anything.
pub fn read_request<R: Read>(reader: &mut R, max_bytes: usize) -> Result<Option<String>> {
    let mut buffer = vec![0u8; max_bytes];
    let read = loop {
        match reader.read(&mut buffer) {
            Ok(n) => break n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    };

    if read == 0 {
        return Ok(None);
    }
    buffer.truncate(read);

    String::from_utf8(buffer)
        .map(Some)
        .map_err(|_| GradebookError::Protocol("request is not valid UTF-8".to_string()))
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(encode_command(command).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response: everything until the peer closes, up to `limit` bytes
pub fn read_response<R: Read>(reader: &mut R, limit: u64) -> Result<Response> {
    let mut bytes = Vec::new();
    reader.take(limit).read_to_end(&mut bytes)?;
    decode_response(&bytes)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
