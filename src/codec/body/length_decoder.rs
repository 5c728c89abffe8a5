//! Decoder for payloads whose size is fixed by the Content-Length header
//! ([RFC 7230 Section 3.3.2](https://tools.ietf.org/html/rfc7230#section-3.3.2)).

use std::cmp;
use std::io;
use std::io::ErrorKind;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{ParseError, PayloadItem};

/// Tracks the remaining bytes of a fixed-length payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    length: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Yields chunks until the declared length is consumed, then `Eof`.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.length == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let len = cmp::min(self.length, src.len() as u64);
        let bytes = src.split_to(len as usize).freeze();

        self.length -= bytes.len() as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            // the peer closed mid-body
            None => Err(ParseError::io(io::Error::new(
                ErrorKind::UnexpectedEof,
                "connection closed before content-length was satisfied",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_declared_length() {
        let mut buffer = BytesMut::from(&b"1012345678rest"[..]);

        let mut decoder = LengthDecoder::new(10);
        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_chunk());
        assert_eq!(item.as_bytes().unwrap().as_ref(), b"1012345678");
        assert_eq!(&buffer[..], b"rest");

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_eof());
    }

    #[test]
    fn partial_then_complete() {
        let mut buffer = BytesMut::from(&b"abc"[..]);
        let mut decoder = LengthDecoder::new(5);

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(item.as_bytes().unwrap().as_ref(), b"abc");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"de");
        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(item.as_bytes().unwrap().as_ref(), b"de");
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn eof_mid_body_is_an_error() {
        let mut buffer = BytesMut::new();
        let mut decoder = LengthDecoder::new(5);
        assert!(decoder.decode_eof(&mut buffer).is_err());
    }
}
