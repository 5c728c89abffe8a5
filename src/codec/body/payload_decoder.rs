//! Unified decoder over the payload delimiting strategies.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::codec::body::until_eof_decoder::UntilEofDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};

/// Decodes a response payload using the strategy selected from the head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Length(LengthDecoder),
    Chunked(ChunkedDecoder),
    UntilEof(UntilEofDecoder),
    NoBody,
}

impl PayloadDecoder {
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    pub fn until_eof() -> Self {
        Self { kind: Kind::UntilEof(UntilEofDecoder) }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::NoBody)
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }
}

impl From<PayloadSize> for PayloadDecoder {
    fn from(size: PayloadSize) -> Self {
        match size {
            PayloadSize::Length(n) => Self::fix_length(n),
            PayloadSize::Chunked => Self::chunked(),
            PayloadSize::UntilEof => Self::until_eof(),
            PayloadSize::Empty => Self::empty(),
        }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::UntilEof(until_eof_decoder) => until_eof_decoder.decode(src),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode_eof(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode_eof(src),
            Kind::UntilEof(until_eof_decoder) => until_eof_decoder.decode_eof(src),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_payload_size() {
        assert!(PayloadDecoder::from(PayloadSize::Empty).is_empty());
        assert!(PayloadDecoder::from(PayloadSize::Chunked).is_chunked());
        assert_eq!(PayloadDecoder::from(PayloadSize::Length(7)), PayloadDecoder::fix_length(7));
        assert_eq!(PayloadDecoder::from(PayloadSize::UntilEof), PayloadDecoder::until_eof());
    }

    #[test]
    fn empty_yields_eof_immediately() {
        let mut decoder = PayloadDecoder::empty();
        let mut buffer = BytesMut::new();
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }
}
