//! Client-level error types: construction, connection establishment,
//! pool acquisition, and the error surface of `Client::send`.

use std::io;
use thiserror::Error;

/// Errors from `Client` construction.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The origin URL could not be parsed
    #[error("invalid url: {source}")]
    InvalidUrl {
        #[from]
        source: url::ParseError,
    },

    /// The URL scheme is not `http` or `https`
    #[error("unsupported scheme: {scheme:?}")]
    InvalidScheme { scheme: String },

    /// The URL has no host component
    #[error("url has no host")]
    HostRequired,

    /// The configured pool bounds are inverted
    #[error("invalid pool size: min {min} exceeds max {max}")]
    InvalidPoolSize { min: usize, max: usize },

    /// Eager pool initialization failed
    #[error("pool initialization failed: {source}")]
    Init {
        #[from]
        source: ConnectError,
    },
}

/// Errors from constructing one new connection to the origin.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Address resolution failed
    #[error("address resolution failed: {source}")]
    Resolve { source: io::Error },

    /// Address resolution exceeded its deadline
    #[error("address resolution timed out")]
    ResolveTimeout,

    /// The host resolved to no usable address
    #[error("host resolved to no address")]
    NoAddress,

    /// The TCP connect failed
    #[error("connect failed: {source}")]
    Connect { source: io::Error },

    /// The TLS handshake failed
    #[error("tls handshake failed: {source}")]
    Tls { source: io::Error },

    /// The host cannot be used as a TLS server name
    #[error("invalid tls server name")]
    InvalidServerName,

    /// Connect plus handshake exceeded the open deadline
    #[error("connection open timed out")]
    OpenTimeout,
}

impl ConnectError {
    pub fn resolve(source: io::Error) -> Self {
        Self::Resolve { source }
    }

    pub fn connect(source: io::Error) -> Self {
        Self::Connect { source }
    }

    pub fn tls(source: io::Error) -> Self {
        Self::Tls { source }
    }
}

/// Errors from acquiring a pooled connection.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// The acquire deadline passed while the pool stayed saturated
    #[error("timed out waiting for a pooled connection")]
    Timeout,

    /// The pool tried to grow and the connection factory failed
    #[error("connection factory failed: {source}")]
    Connect {
        #[from]
        source: ConnectError,
    },
}

/// The error surface of `Client::send`.
///
/// Exchange failures on a pooled connection are retried transparently,
/// so the caller only ever observes a failure to obtain a connection.
#[derive(Error, Debug)]
pub enum SendRequestError {
    /// No pooled connection became available within the borrow timeout
    #[error("timed out acquiring a pooled connection")]
    AcquireTimeout,

    /// A new connection could not be established
    #[error("failed to establish a connection: {source}")]
    Connect {
        #[from]
        source: ConnectError,
    },
}

impl From<AcquireError> for SendRequestError {
    fn from(e: AcquireError) -> Self {
        match e {
            AcquireError::Timeout => Self::AcquireTimeout,
            AcquireError::Connect { source } => Self::Connect { source },
        }
    }
}
