//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Request Format
//! ```text
//! OPCODE(|FIELD)*
//! ```
//!
//! ### Commands
//! | Opcode               | Fields                      |
//! |----------------------|-----------------------------|
//! | `AGREGAR_ESTUDIANTE` | id, name                    |
//! | `AGREGAR`            | id, subject, score          |
//! | `BUSCAR`             | id                          |
//! | `ACTUALIZAR`         | id, [subject,] score        |
//! | `LISTAR`             | none                        |
//! | `ELIMINAR`           | id                          |
//!
//! ## Response Format
//! A JSON object with a `status` of `ok`, `not_found` or `error`, plus a
//! `mensaje` string or a `data` value.

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_response, encode_command, encode_response, parse_command, read_request,
    read_response, write_command, write_response, FIELD_SEPARATOR, MAX_RESPONSE_SIZE,
};
