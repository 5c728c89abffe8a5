use bytes::Bytes;

/// A decoded HTTP message fragment: either a head or a piece of payload.
///
/// The response decoder produces one `Header` item per response, followed
/// by zero or more `Payload` chunks and a terminating
/// [`PayloadItem::Eof`].
pub enum Message<T> {
    /// The head of the message (status line / request line plus headers)
    Header(T),
    /// A chunk of payload data or the end-of-payload marker
    Payload(PayloadItem),
}

/// An item in the payload stream of an HTTP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A chunk of payload data
    Chunk(Bytes),
    /// Marks the end of the payload stream
    Eof,
}

/// How the payload of a message is delimited on the wire.
///
/// Responses have one delimiting mode more than requests: a server may
/// omit both `Content-Length` and `Transfer-Encoding` and terminate the
/// body by closing the connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes (`Content-Length`)
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Payload delimited by connection close
    UntilEof,
    /// No payload
    Empty,
}

impl PayloadSize {
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }
}

impl<T> Message<T> {
    #[inline]
    pub fn is_payload(&self) -> bool {
        matches!(self, Message::Payload(_))
    }

    #[inline]
    pub fn is_header(&self) -> bool {
        matches!(self, Message::Header(_))
    }
}

impl PayloadItem {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns a reference to the contained bytes if this is a `Chunk`.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the item and returns the contained bytes if this is a `Chunk`.
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}
