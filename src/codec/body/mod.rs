//! Payload framing for HTTP response bodies.
//!
//! Three delimiting strategies exist on the response side:
//!
//! - [`LengthDecoder`]: fixed-size payloads (`Content-Length`)
//! - [`ChunkedDecoder`]: chunked transfer encoding (RFC 7230 §4.1)
//! - [`UntilEofDecoder`]: no explicit framing, the body runs until the
//!   peer closes the connection
//!
//! [`PayloadDecoder`] selects and drives the strategy chosen from the
//! response head.

mod chunked_decoder;
mod length_decoder;
mod payload_decoder;
mod until_eof_decoder;

pub use payload_decoder::PayloadDecoder;
