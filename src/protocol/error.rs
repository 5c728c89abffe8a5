//! Error types for the HTTP exchange on a single connection.
//!
//! The error types form a hierarchy where [`HttpError`] is the top-level
//! error for one serialize→parse exchange:
//!
//! - [`SendError`]: errors while serializing the request to the stream
//! - [`ParseError`]: errors while reading and parsing the response
//! - [`UpgradeError`]: errors raised by a caller-supplied upgrade handler
//!
//! Every phase of an exchange runs under an absolute deadline, so each
//! error type carries an explicit `Timeout` variant alongside its I/O and
//! protocol variants.

use std::io;
use thiserror::Error;

/// The top-level error for one request/response exchange.
///
/// An exchange error never reaches the caller of `Client::send` directly:
/// the send loop disposes the failed connection and retries, surfacing an
/// error only when a fresh connection cannot be acquired.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Errors that occur while serializing and sending the request
    #[error("send error: {source}")]
    SendError {
        #[from]
        source: SendError,
    },

    /// Errors that occur while reading and parsing the response
    #[error("parse error: {source}")]
    ParseError {
        #[from]
        source: ParseError,
    },

    /// Errors raised inside a caller-provided upgrade handler
    #[error("upgrade error: {source}")]
    UpgradeError {
        #[from]
        source: UpgradeError,
    },
}

/// Errors that occur during HTTP response parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Header size exceeds the maximum allowed size
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    /// Number of headers exceeds the maximum allowed
    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    /// Invalid header format or content
    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    /// Unsupported HTTP version
    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    /// Missing or out-of-range status code
    #[error("invalid http status code")]
    InvalidStatus,

    /// Invalid Content-Length header
    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    /// Invalid response body
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    /// I/O error during parsing
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// The parse deadline passed before a complete response was read
    #[error("response parse timed out")]
    Timeout,
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors that occur during request serialization and stream shutdown.
#[derive(Error, Debug)]
pub enum SendError {
    /// The request cannot be represented on the wire
    #[error("invalid message: {reason}")]
    InvalidMessage { reason: String },

    /// I/O error during sending
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// The serialize (or close) deadline passed before completion
    #[error("request serialize timed out")]
    Timeout,
}

impl SendError {
    pub fn invalid_message<S: ToString>(str: S) -> Self {
        Self::InvalidMessage { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// An error raised by a caller-provided upgrade handler.
#[derive(Debug, Error)]
#[error("upgrade handler failed: {source}")]
pub struct UpgradeError {
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl UpgradeError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self { source: source.into() }
    }
}

impl From<io::Error> for UpgradeError {
    fn from(e: io::Error) -> Self {
        Self::new(e)
    }
}
