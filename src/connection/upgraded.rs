use std::cmp;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::client::ClientStream;

/// The raw byte stream handed to an upgrade handler.
///
/// Implements `AsyncRead`/`AsyncWrite` directly: reads first drain any
/// bytes the response parser had buffered past the `101` head, then fall
/// through to the underlying stream. The handler borrows the stream for
/// the duration of its call; afterwards the client closes it gracefully
/// and disposes the connection (it is never returned to the pool, since
/// its protocol state is no longer HTTP).
pub struct UpgradedIo<'a> {
    read_buf: Bytes,
    io: &'a mut ClientStream,
}

impl<'a> UpgradedIo<'a> {
    pub(crate) fn new(read_buf: Bytes, io: &'a mut ClientStream) -> Self {
        Self { read_buf, io }
    }

    /// Bytes that arrived on the wire after the response head and before
    /// the handoff. Empty once read through the `AsyncRead` impl.
    pub fn read_buf(&self) -> &Bytes {
        &self.read_buf
    }

    /// Splits into the buffered bytes and the bare stream.
    pub fn into_parts(self) -> (Bytes, &'a mut ClientStream) {
        (self.read_buf, self.io)
    }
}

impl AsyncRead for UpgradedIo<'_> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if !this.read_buf.is_empty() {
            let len = cmp::min(buf.remaining(), this.read_buf.len());
            buf.put_slice(&this.read_buf.split_to(len));
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut *this.io).poll_read(cx, buf)
    }
}

impl AsyncWrite for UpgradedIo<'_> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Pin::new(&mut *self.get_mut().io).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.get_mut().io).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.get_mut().io).poll_shutdown(cx)
    }
}
