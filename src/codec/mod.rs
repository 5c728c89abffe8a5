//! Streaming HTTP/1.1 codec for the client role.
//!
//! The codec pairs a one-shot [`RequestEncoder`] with a state-machine
//! [`ResponseDecoder`] over the same byte stream:
//!
//! - Request handling: the whole request (head plus buffered body) is
//!   written in one `encode` call via the [`header`] module
//! - Response handling: the head is parsed first, then the payload flows
//!   through the framing decoders of the [`body`] module until `Eof`
//!
//! [`ClientCodec`] bundles the two for use with `tokio_util`'s `Framed`,
//! which is how a pooled connection drives one serialize→parse exchange
//! at a time.

mod body;
mod header;
mod request_encoder;
mod response_decoder;

pub use request_encoder::RequestEncoder;
pub use response_decoder::ResponseDecoder;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::protocol::{ClientRequest, Message, ParseError, PayloadSize, ResponseHead, SendError};

/// The combined encoder/decoder bound to one connection.
pub struct ClientCodec {
    encoder: RequestEncoder,
    decoder: ResponseDecoder,
}

impl ClientCodec {
    /// `serializer_buffer_size` is reserved in the write buffer per
    /// request; the read buffer capacity is configured on the `Framed`
    /// transport itself.
    pub fn new(serializer_buffer_size: usize) -> Self {
        Self { encoder: RequestEncoder::new(serializer_buffer_size), decoder: ResponseDecoder::new() }
    }

    /// See [`ResponseDecoder::set_head_request`].
    pub fn set_head_request(&mut self, head_request: bool) {
        self.decoder.set_head_request(head_request);
    }
}

impl<'a> Encoder<&'a ClientRequest> for ClientCodec {
    type Error = SendError;

    fn encode(&mut self, request: &'a ClientRequest, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encoder.encode(request, dst)
    }
}

impl Decoder for ClientCodec {
    type Item = Message<(ResponseHead, PayloadSize)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decoder.decode(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decoder.decode_eof(src)
    }
}
