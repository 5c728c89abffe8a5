//! Streaming decoder for HTTP responses.
//!
//! The decoder operates in two phases, tracked by the `payload_decoder`
//! field:
//!
//! 1. Head parsing: `None` — the status line and headers are decoded by
//!    [`HeaderDecoder`] and the payload strategy is selected
//! 2. Payload parsing: `Some(_)` — body bytes flow through the selected
//!    [`PayloadDecoder`] until it yields `Eof`
//!
//! After `Eof` the decoder returns to phase 1, ready for the next
//! response on a reused connection.

use std::io;
use std::io::ErrorKind;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, ResponseHead};

pub struct ResponseDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
    head_request: bool,
}

impl ResponseDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Tells the decoder whether the response being awaited answers a
    /// HEAD request; such a response never carries a body regardless of
    /// its framing headers.
    pub fn set_head_request(&mut self, head_request: bool) {
        self.head_request = head_request;
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self { header_decoder: HeaderDecoder, payload_decoder: None, head_request: false }
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<(ResponseHead, PayloadSize)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // parse payload if have payload_decoder
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    // this response is complete, await the next head
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        // parse response head
        let message = match self.header_decoder.decode(src, self.head_request)? {
            Some((head, payload_size)) => {
                self.payload_decoder = Some(payload_size.into());
                Some(Message::Header((head, payload_size)))
            }
            None => None,
        };

        Ok(message)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode_eof(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };
            return Ok(message);
        }

        if src.is_empty() {
            // clean close between responses
            Ok(None)
        } else {
            Err(ParseError::io(io::Error::new(
                ErrorKind::UnexpectedEof,
                "connection closed inside a response head",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use indoc::indoc;

    fn collect_body(decoder: &mut ResponseDecoder, buf: &mut BytesMut) -> Vec<u8> {
        let mut body = Vec::new();
        loop {
            match decoder.decode(buf).unwrap() {
                Some(Message::Payload(PayloadItem::Chunk(bytes))) => body.extend_from_slice(&bytes),
                Some(Message::Payload(PayloadItem::Eof)) => return body,
                Some(Message::Header(_)) => panic!("unexpected second head"),
                None => panic!("incomplete fixture"),
            }
        }
    }

    #[test]
    fn head_then_length_payload() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Content-Length: 5

        hello"##};

        let mut buf = BytesMut::from(str);
        let mut decoder = ResponseDecoder::new();

        let message = decoder.decode(&mut buf).unwrap().unwrap();
        let (head, payload_size) = match message {
            Message::Header(head) => head,
            Message::Payload(_) => panic!("expected head first"),
        };
        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(payload_size, PayloadSize::Length(5));

        assert_eq!(collect_body(&mut decoder, &mut buf), b"hello");
    }

    #[test]
    fn chunked_payload_across_feeds() {
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhel");
        let mut decoder = ResponseDecoder::new();

        assert!(matches!(decoder.decode(&mut buf).unwrap(), Some(Message::Header(_))));

        let mut body = Vec::new();
        loop {
            match decoder.decode(&mut buf).unwrap() {
                Some(Message::Payload(PayloadItem::Chunk(bytes))) => body.extend_from_slice(&bytes),
                Some(Message::Payload(PayloadItem::Eof)) => break,
                Some(Message::Header(_)) => panic!("unexpected second head"),
                None => buf.extend_from_slice(b"lo\r\n0\r\n\r\n"),
            }
        }
        assert_eq!(body, b"hello");
    }

    #[test]
    fn ready_for_next_response_after_eof() {
        let two = "HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\naHTTP/1.1 204 No Content\r\n\r\n";
        let mut buf = BytesMut::from(two);
        let mut decoder = ResponseDecoder::new();

        assert!(matches!(decoder.decode(&mut buf).unwrap(), Some(Message::Header(_))));
        assert_eq!(collect_body(&mut decoder, &mut buf), b"a");

        let message = decoder.decode(&mut buf).unwrap().unwrap();
        match message {
            Message::Header((head, payload_size)) => {
                assert_eq!(head.status(), StatusCode::NO_CONTENT);
                assert_eq!(payload_size, PayloadSize::Empty);
            }
            Message::Payload(_) => panic!("expected a head"),
        }
    }

    #[test]
    fn close_delimited_body_ends_at_eof() {
        let mut buf = BytesMut::from("HTTP/1.0 200 OK\r\n\r\nall the bytes");
        let mut decoder = ResponseDecoder::new();

        assert!(matches!(decoder.decode(&mut buf).unwrap(), Some(Message::Header(_))));

        let chunk = decoder.decode(&mut buf).unwrap().unwrap();
        match chunk {
            Message::Payload(PayloadItem::Chunk(bytes)) => assert_eq!(bytes.as_ref(), b"all the bytes"),
            _ => panic!("expected a chunk"),
        }

        // more data may still arrive
        assert!(decoder.decode(&mut buf).unwrap().is_none());

        // the peer closing the stream terminates the body
        let eof = decoder.decode_eof(&mut buf).unwrap().unwrap();
        assert!(matches!(eof, Message::Payload(PayloadItem::Eof)));

        // and the decoder is back in head phase with an empty buffer
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn eof_inside_head_is_an_error() {
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nContent-");
        let mut decoder = ResponseDecoder::new();

        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert!(decoder.decode_eof(&mut buf).is_err());
    }
}
