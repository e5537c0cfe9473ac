//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor loop (non-blocking, polls the shutdown flag)
//! - One thread per accepted connection, capped by an admission gate
//! - One request and one response per connection
//! - Requests routed through Engine

mod server;
mod connection;
pub mod transport;

pub use server::Server;
pub use connection::Connection;
