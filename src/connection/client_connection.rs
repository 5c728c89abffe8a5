use std::io;
use std::io::ErrorKind;

use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::time::{timeout_at, Instant};
use tokio_util::codec::Framed;
use tracing::trace;

use crate::client::ClientStream;
use crate::codec::ClientCodec;
use crate::connection::UpgradedIo;
use crate::protocol::{ClientRequest, Message, ParseError, PayloadItem, Response, SendError};

/// One pooled connection: the stream plus its bound serializer and
/// parser.
///
/// The connection lives from factory creation until the pool drops it;
/// dropping closes the transport. Serialization and parsing are strictly
/// sequential on one connection, each bounded by the absolute deadline
/// passed in by the send loop.
pub struct ClientConnection {
    framed: Framed<ClientStream, ClientCodec>,
}

impl ClientConnection {
    pub(crate) fn new(stream: ClientStream, parser_buffer_size: usize, serializer_buffer_size: usize) -> Self {
        let codec = ClientCodec::new(serializer_buffer_size);
        Self { framed: Framed::with_capacity(stream, codec, parser_buffer_size) }
    }

    /// Writes one request (head and body) and flushes it, failing with
    /// [`SendError::Timeout`] once `deadline` passes.
    pub(crate) async fn serialize(&mut self, request: &ClientRequest, deadline: Instant) -> Result<(), SendError> {
        match timeout_at(deadline, self.framed.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(SendError::Timeout),
        }
    }

    /// Reads exactly one response, buffering the payload, failing with
    /// [`ParseError::Timeout`] once `deadline` passes.
    pub(crate) async fn parse(&mut self, head_request: bool, deadline: Instant) -> Result<Response, ParseError> {
        match timeout_at(deadline, self.do_parse(head_request)).await {
            Ok(result) => result,
            Err(_) => Err(ParseError::Timeout),
        }
    }

    async fn do_parse(&mut self, head_request: bool) -> Result<Response, ParseError> {
        self.framed.codec_mut().set_head_request(head_request);

        let (head, payload_size) = match self.framed.next().await {
            Some(Ok(Message::Header(head))) => head,
            Some(Ok(Message::Payload(_))) => {
                return Err(ParseError::invalid_body("expected a response head but received payload"))
            }
            Some(Err(e)) => return Err(e),
            None => {
                return Err(ParseError::io(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "connection closed before a response arrived",
                )))
            }
        };
        trace!(status = %head.status(), ?payload_size, "parsed response head");

        let mut body = BytesMut::new();
        loop {
            match self.framed.next().await {
                Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => body.extend_from_slice(&bytes),
                Some(Ok(Message::Payload(PayloadItem::Eof))) => break,
                Some(Ok(Message::Header(_))) => {
                    return Err(ParseError::invalid_body("expected payload but received a new head"))
                }
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(ParseError::io(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "connection closed inside the response body",
                    )))
                }
            }
        }

        Ok(head.map(|()| body.freeze()))
    }

    /// Hands the raw stream to an upgrade handler, together with any
    /// bytes the parser had already buffered past the response head.
    pub(crate) fn upgraded(&mut self) -> UpgradedIo<'_> {
        let read_buf = self.framed.read_buffer_mut().split().freeze();
        UpgradedIo::new(read_buf, self.framed.get_mut())
    }

    /// Gracefully closes the write side of the stream. Used after an
    /// upgrade handler returns; the connection is disposed afterwards.
    pub(crate) async fn shutdown(&mut self, deadline: Instant) -> Result<(), SendError> {
        match timeout_at(deadline, self.framed.get_mut().shutdown()).await {
            Ok(result) => result.map_err(SendError::io),
            Err(_) => Err(SendError::Timeout),
        }
    }
}
