//! Decoder for chunked transfer encoding
//! ([RFC 7230 Section 4.1](https://tools.ietf.org/html/rfc7230#section-4.1)).
//!
//! The decoder is line-oriented: chunk-size lines and trailer lines are
//! consumed as whole CRLF-terminated lines, chunk data is streamed out
//! as it arrives. Chunk extensions are ignored; trailer fields are read
//! and discarded.

use std::cmp;
use std::io;
use std::io::ErrorKind;

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::protocol::{ParseError, PayloadItem};

/// A chunk-size or trailer line may not grow beyond this before its LF
/// arrives.
const MAX_LINE_BYTES: usize = 4096;

/// Streaming decoder for a chunked payload.
///
/// A single wire chunk may surface as several [`PayloadItem::Chunk`]s
/// when its data straddles reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    phase: Phase,
}

/// Where the decoder stands in the chunked grammar. The phase is a plain
/// value; every transition replaces it wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Awaiting a complete `<hex-size>[;extensions]` line
    SizeLine,
    /// Streaming chunk data, this many bytes still owed
    Data(u64),
    /// Awaiting the CRLF that closes a chunk's data
    DataCrlf,
    /// Past the last chunk, discarding trailer lines until the empty one
    Trailers,
    /// The terminating empty line has been seen
    Done,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { phase: Phase::SizeLine }
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.phase {
                Phase::SizeLine => {
                    let line = match take_line(src)? {
                        Some(line) => line,
                        None => return Ok(None),
                    };
                    let size = parse_chunk_size(&line)?;
                    trace!(size, "read chunk size line");
                    self.phase = if size == 0 { Phase::Trailers } else { Phase::Data(size) };
                }

                Phase::Data(remaining) => {
                    if src.is_empty() {
                        return Ok(None);
                    }
                    let take = cmp::min(remaining, src.len() as u64) as usize;
                    let rest = remaining - take as u64;
                    self.phase = if rest == 0 { Phase::DataCrlf } else { Phase::Data(rest) };
                    return Ok(Some(PayloadItem::Chunk(src.split_to(take).freeze())));
                }

                Phase::DataCrlf => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    if &src[..2] != b"\r\n" {
                        return Err(ParseError::invalid_body("chunk data is not closed by CRLF"));
                    }
                    let _ = src.split_to(2);
                    self.phase = Phase::SizeLine;
                }

                Phase::Trailers => {
                    let line = match take_line(src)? {
                        Some(line) => line,
                        None => return Ok(None),
                    };
                    if line.is_empty() {
                        self.phase = Phase::Done;
                    } else {
                        trace!(len = line.len(), "discarded trailer field");
                    }
                }

                Phase::Done => return Ok(Some(PayloadItem::Eof)),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Err(ParseError::io(io::Error::new(
                ErrorKind::UnexpectedEof,
                "connection closed before the final chunk",
            ))),
        }
    }
}

/// Splits one CRLF-terminated line off `src`, without its line ending.
///
/// Returns `None` while the LF has not arrived. A line ending in a bare
/// LF is rejected, which also rejects extensions trying to hide one.
fn take_line(src: &mut BytesMut) -> Result<Option<BytesMut>, ParseError> {
    match src.iter().position(|&byte| byte == b'\n') {
        Some(end) => {
            if end == 0 || src[end - 1] != b'\r' {
                return Err(ParseError::invalid_body("chunk line ends in a bare LF"));
            }
            let mut line = src.split_to(end + 1);
            line.truncate(end - 1);
            Ok(Some(line))
        }
        None if src.len() > MAX_LINE_BYTES => {
            Err(ParseError::invalid_body("chunk line exceeds the line limit"))
        }
        None => Ok(None),
    }
}

/// Parses the hexadecimal size that opens a chunk line. Whitespace may
/// pad the size; anything after it must open a `;extension`, which is
/// not interpreted further.
fn parse_chunk_size(line: &[u8]) -> Result<u64, ParseError> {
    let mut size: u64 = 0;
    let mut digits = 0;
    for &byte in line {
        match hex_value(byte) {
            Some(value) => {
                size = size
                    .checked_mul(16)
                    .and_then(|s| s.checked_add(value))
                    .ok_or_else(|| ParseError::invalid_body("chunk size overflows u64"))?;
                digits += 1;
            }
            None => break,
        }
    }
    if digits == 0 {
        return Err(ParseError::invalid_body("chunk line carries no size"));
    }

    match line[digits..].iter().copied().find(|&byte| byte != b' ' && byte != b'\t') {
        None | Some(b';') => Ok(size),
        Some(_) => Err(ParseError::invalid_body("unexpected byte after chunk size")),
    }
}

fn hex_value(byte: u8) -> Option<u64> {
    match byte {
        b'0'..=b'9' => Some((byte - b'0') as u64),
        b'a'..=b'f' => Some((byte - b'a' + 10) as u64),
        b'A'..=b'F' => Some((byte - b'A' + 10) as u64),
        _ => None,
    }
}
