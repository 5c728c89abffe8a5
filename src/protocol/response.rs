//! HTTP response type definitions.
//!
//! The head of a response is represented with the standard
//! `http::Response` type and an empty body placeholder; once the payload
//! has been read in full it is attached as [`bytes::Bytes`].

use bytes::Bytes;

/// The head portion of an HTTP response, before the body is attached.
pub type ResponseHead = http::Response<()>;

/// A complete HTTP response with its body buffered in memory.
///
/// The engine reads exactly one response per exchange and hands it to the
/// caller only once the payload is complete, so the body is always a
/// fully materialized byte buffer.
pub type Response = http::Response<Bytes>;
