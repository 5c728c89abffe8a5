use bytes::BytesMut;
use http::{HeaderName, HeaderValue, Response, StatusCode, Version};
use httparse::Status;
use tracing::trace;

use crate::protocol::{ParseError, PayloadSize, ResponseHead};
use crate::utils::ensure;

const MAX_HEADER_NUM: usize = 64;
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Parses the head of one HTTP response.
///
/// Parsing does not implement [`tokio_util::codec::Decoder`] directly
/// because delimiting the payload needs request context (a reply to a
/// HEAD request never has a body, whatever its headers claim); the
/// surrounding [`ResponseDecoder`](crate::codec::ResponseDecoder)
/// provides that hint.
pub struct HeaderDecoder;

impl HeaderDecoder {
    pub fn decode(
        &mut self,
        src: &mut BytesMut,
        head_request: bool,
    ) -> Result<Option<(ResponseHead, PayloadSize)>, ParseError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut parsed = httparse::Response::new(&mut headers);

        let parsed_result = parsed.parse(src).map_err(|e| match e {
            httparse::Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        match parsed_result? {
            Status::Complete(head_size) => {
                trace!(head_size, "parsed response head");
                ensure!(head_size <= MAX_HEADER_BYTES, ParseError::too_large_header(head_size, MAX_HEADER_BYTES));

                let version = match parsed.version {
                    Some(0) => Version::HTTP_10,
                    Some(1) => Version::HTTP_11,
                    v => return Err(ParseError::InvalidVersion(v)),
                };

                let status = parsed
                    .code
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .ok_or(ParseError::InvalidStatus)?;

                // compute the header bytes index before the parse borrow ends
                let mut header_index: [HeaderIndex; MAX_HEADER_NUM] = EMPTY_HEADER_INDEX_ARRAY;
                let header_count = parsed.headers.len();
                HeaderIndex::record(src, parsed.headers, &mut header_index);

                let mut builder = Response::builder().status(status).version(version);

                let headers = builder.headers_mut().unwrap();
                headers.reserve(header_count);

                let head_bytes = src.split_to(head_size).freeze();
                for index in &header_index[..header_count] {
                    // it's safe to use unwrap here because httparse has checked the header name is valid ASCII
                    let name = HeaderName::from_bytes(&head_bytes[index.name.0..index.name.1]).unwrap();

                    // SAFETY: httparse already checks header value is only visible ASCII bytes
                    // from_maybe_shared_unchecked contains debug assertions so they are omitted here
                    let value = unsafe {
                        HeaderValue::from_maybe_shared_unchecked(head_bytes.slice(index.value.0..index.value.1))
                    };

                    headers.append(name, value);
                }

                let head = builder.body(()).unwrap();
                let payload_size = parse_payload(&head, head_request)?;

                Ok(Some((head, payload_size)))
            }
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

#[derive(Clone, Copy)]
struct HeaderIndex {
    name: (usize, usize),
    value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

const EMPTY_HEADER_INDEX_ARRAY: [HeaderIndex; MAX_HEADER_NUM] = [EMPTY_HEADER_INDEX; MAX_HEADER_NUM];

impl HeaderIndex {
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            let name_start = header.name.as_ptr() as usize - bytes_ptr;
            let name_end = name_start + header.name.len();
            indices.name = (name_start, name_end);
            let value_start = header.value.as_ptr() as usize - bytes_ptr;
            let value_end = value_start + header.value.len();
            indices.value = (value_start, value_end);
        }
    }
}

/// Selects how the response payload is delimited.
///
/// Refer: <https://www.rfc-editor.org/rfc/rfc7230#section-3.3.3>
fn parse_payload(head: &ResponseHead, head_request: bool) -> Result<PayloadSize, ParseError> {
    let status = head.status();
    if head_request
        || status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
    {
        return Ok(PayloadSize::Empty);
    }

    let te_header = head.headers().get(http::header::TRANSFER_ENCODING);
    let cl_header = head.headers().get(http::header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        // no explicit framing: the body runs until the peer closes
        (None, None) => Ok(PayloadSize::UntilEof),

        (te_value @ Some(_), None) => {
            if is_chunked(te_value) {
                Ok(PayloadSize::Chunked)
            } else {
                // a transfer encoding that does not end in "chunked" is
                // also close-delimited on the response side
                Ok(PayloadSize::UntilEof)
            }
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;

            let length = cl_str
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            if length == 0 {
                Ok(PayloadSize::Empty)
            } else {
                Ok(PayloadSize::Length(length))
            }
        }

        (Some(_), Some(_)) => {
            Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers"))
        }
    }
}

fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    header_value
        .and_then(|value| value.to_str().ok())
        .and_then(|encodings| encodings.rsplit(',').next())
        .map(|last_encoding| last_encoding.trim() == "chunked")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;
    use indoc::indoc;

    fn decode(input: &str) -> Result<Option<(ResponseHead, PayloadSize)>, ParseError> {
        let mut buf = BytesMut::from(input);
        HeaderDecoder.decode(&mut buf, false)
    }

    #[test]
    fn check_is_chunked() {
        {
            let headers = HeaderMap::new();
            assert!(!is_chunked(headers.get(http::header::TRANSFER_ENCODING)))
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "gzip, chunked".parse().unwrap());
            assert!(is_chunked(headers.get(http::header::TRANSFER_ENCODING)));
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "chunked, gzip".parse().unwrap());
            assert!(!is_chunked(headers.get(http::header::TRANSFER_ENCODING)));
        }
    }

    #[test]
    fn ok_with_content_length() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Content-Type: text/plain
        Content-Length: 5

        hello"##};

        let mut buf = BytesMut::from(str);
        let (head, payload_size) = HeaderDecoder.decode(&mut buf, false).unwrap().unwrap();

        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(head.version(), Version::HTTP_11);
        assert_eq!(head.headers().len(), 2);
        assert_eq!(head.headers().get(http::header::CONTENT_TYPE), Some(&HeaderValue::from_static("text/plain")));
        assert_eq!(payload_size, PayloadSize::Length(5));

        // the body stays in the buffer
        assert_eq!(&buf[..], b"hello");
    }

    #[test]
    fn partial_head_needs_more_data() {
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nContent-");
        let result = HeaderDecoder.decode(&mut buf, false).unwrap();
        assert!(result.is_none());
        // nothing consumed
        assert_eq!(&buf[..], b"HTTP/1.1 200 OK\r\nContent-");
    }

    #[test]
    fn chunked_transfer_encoding() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Transfer-Encoding: chunked

        "##};

        let (_, payload_size) = decode(str).unwrap().unwrap();
        assert_eq!(payload_size, PayloadSize::Chunked);
    }

    #[test]
    fn no_framing_headers_reads_until_close() {
        let str = indoc! {r##"
        HTTP/1.0 200 OK
        Content-Type: text/html

        "##};

        let (head, payload_size) = decode(str).unwrap().unwrap();
        assert_eq!(head.version(), Version::HTTP_10);
        assert_eq!(payload_size, PayloadSize::UntilEof);
    }

    #[test]
    fn no_content_and_not_modified_have_no_body() {
        let (_, payload_size) = decode("HTTP/1.1 204 No Content\r\n\r\n").unwrap().unwrap();
        assert_eq!(payload_size, PayloadSize::Empty);

        let (_, payload_size) = decode("HTTP/1.1 304 Not Modified\r\n\r\n").unwrap().unwrap();
        assert_eq!(payload_size, PayloadSize::Empty);
    }

    #[test]
    fn switching_protocols_has_no_body() {
        let str = indoc! {r##"
        HTTP/1.1 101 Switching Protocols
        Upgrade: websocket
        Connection: Upgrade

        "##};

        let (head, payload_size) = decode(str).unwrap().unwrap();
        assert_eq!(head.status(), StatusCode::SWITCHING_PROTOCOLS);
        assert_eq!(payload_size, PayloadSize::Empty);
    }

    #[test]
    fn head_request_reply_has_no_body() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Content-Length: 12345

        "##};

        let mut buf = BytesMut::from(str);
        let (_, payload_size) = HeaderDecoder.decode(&mut buf, true).unwrap().unwrap();
        assert_eq!(payload_size, PayloadSize::Empty);
    }

    #[test]
    fn both_framing_headers_is_an_error() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Transfer-Encoding: chunked
        Content-Length: 5

        "##};

        assert!(decode(str).is_err());
    }

    #[test]
    fn rejects_unsupported_version() {
        assert!(matches!(decode("HTTP/1.2 200 OK\r\n\r\n"), Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn rejects_bad_content_length() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Content-Length: five

        "##};

        assert!(matches!(decode(str), Err(ParseError::InvalidContentLength { .. })));
    }
}
