//! One-shot encoder for outgoing HTTP requests.
//!
//! The whole request (head and buffered body) is written in a single
//! `encode` call; the framed transport then flushes the write buffer
//! under the serialize deadline. The encoder borrows the request so the
//! send loop can serialize the same request again on a fresh connection
//! after disposing a failed one.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::codec::header::HeaderEncoder;
use crate::protocol::{ClientRequest, SendError};

pub struct RequestEncoder {
    header_encoder: HeaderEncoder,
    buffer_size: usize,
}

impl RequestEncoder {
    /// `buffer_size` is reserved in the write buffer up front.
    pub fn new(buffer_size: usize) -> Self {
        Self { header_encoder: HeaderEncoder, buffer_size }
    }
}

impl<'a> Encoder<&'a ClientRequest> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, request: &'a ClientRequest, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(self.buffer_size.max(request.body().len()));

        self.header_encoder.encode(request, dst)?;

        if !request.body().is_empty() {
            dst.put_slice(request.body());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(request: &ClientRequest) -> String {
        let mut encoder = RequestEncoder::new(4096);
        let mut dst = BytesMut::new();
        encoder.encode(request, &mut dst).unwrap();
        String::from_utf8(dst.to_vec()).unwrap()
    }

    #[test]
    fn head_only_request() {
        let request = ClientRequest::builder().get("/").build().unwrap();
        assert_eq!(encode(&request), "GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn body_follows_blank_line() {
        let request = ClientRequest::builder()
            .post("/echo")
            .header("content-length", "11")
            .body("hello world")
            .build()
            .unwrap();

        assert_eq!(encode(&request), "POST /echo HTTP/1.1\r\ncontent-length: 11\r\n\r\nhello world");
    }

    #[test]
    fn encoding_twice_is_identical() {
        let request = ClientRequest::builder().get("/again").header("accept", "*/*").build().unwrap();
        assert_eq!(encode(&request), encode(&request));
    }
}
