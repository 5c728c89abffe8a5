//! A single pooled HTTP/1.1 session.
//!
//! # Components
//!
//! - [`ClientConnection`]: one reusable session — the duplex stream with
//!   its bound request encoder and response decoder. It drives exactly
//!   one serialize→parse exchange at a time (no pipelining) and is either
//!   returned to the pool afterwards or dropped, which closes the
//!   transport.
//! - [`UpgradedIo`]: the raw byte stream handed to a caller-supplied
//!   upgrade handler once a `101 Switching Protocols` response has been
//!   parsed.

mod client_connection;
mod upgraded;

pub use client_connection::ClientConnection;
pub use upgraded::UpgradedIo;
