//! Decoder for close-delimited payloads
//! ([RFC 7230 Section 3.3.3](https://tools.ietf.org/html/rfc7230#section-3.3.3)).
//!
//! When a response carries neither `Content-Length` nor a chunked
//! `Transfer-Encoding`, the body extends until the peer closes the
//! connection. The end of the payload is therefore only observable
//! through `decode_eof`. A connection that served such a response cannot
//! carry another request; the peer has already closed it, so the next
//! borrower's exchange fails and the pool replaces it.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{ParseError, PayloadItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UntilEofDecoder;

impl Decoder for UntilEofDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        let bytes = src.split().freeze();
        Ok(Some(PayloadItem::Chunk(bytes)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Ok(Some(PayloadItem::Eof)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_buffer_then_waits() {
        let mut buffer = BytesMut::from(&b"partial body"[..]);
        let mut decoder = UntilEofDecoder;

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(item.as_bytes().unwrap().as_ref(), b"partial body");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn close_marks_eof() {
        let mut buffer = BytesMut::from(&b"tail"[..]);
        let mut decoder = UntilEofDecoder;

        let item = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert_eq!(item.as_bytes().unwrap().as_ref(), b"tail");

        let item = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert!(item.is_eof());
    }
}
