//! A client-side HTTP/1.1 engine for a single origin.
//!
//! `micro-client` issues HTTP/1.x requests to one origin (scheme, host,
//! port) over plain TCP or TLS, reusing a bounded pool of persistent
//! connections, and returns fully parsed responses. Protocol upgrades
//! (e.g. WebSocket handshakes) hand the raw byte stream back to the
//! caller after a `101 Switching Protocols` response.
//!
//! # Modules
//!
//! - [`client`]: the public entry point — origin configuration, the
//!   connection pool, and the send loop
//! - [`connection`]: a single pooled session (stream + request encoder +
//!   response decoder)
//! - [`codec`]: streaming HTTP/1.1 encoding and decoding
//! - [`protocol`]: request/response types, message framing and errors
//!
//! # Example
//!
//! ```no_run
//! use micro_client::client::Client;
//! use micro_client::protocol::ClientRequest;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("http://example.com").await?;
//! let mut request = ClientRequest::builder().get("/index.html").build()?;
//! let response = client.send(&mut request).await?;
//! println!("{} ({} body bytes)", response.status(), response.body().len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod connection;
pub mod protocol;

pub(crate) mod utils;

pub use client::{Client, ClientConfig, PoolSize};
pub use protocol::{ClientRequest, Response};
