use bytes::{BufMut, BytesMut};
use http::Version;
use std::io;
use std::io::ErrorKind;
use tracing::error;

use crate::protocol::{ClientRequest, SendError};

/// Writes the request line and header block of an outgoing request.
///
/// Headers are emitted verbatim in insertion order. The encoder never
/// adds framing headers; `Content-Length`/`Transfer-Encoding` are the
/// caller's responsibility, and `Host`/`User-Agent` have already been
/// stamped by the client.
pub struct HeaderEncoder;

impl HeaderEncoder {
    pub fn encode(&mut self, request: &ClientRequest, dst: &mut BytesMut) -> Result<(), SendError> {
        dst.put_slice(request.method().as_str().as_bytes());
        dst.put_slice(b" ");

        let target = request.target();
        match target.path_and_query() {
            Some(path_and_query) => dst.put_slice(path_and_query.as_str().as_bytes()),
            // an empty target still needs a request line
            None => dst.put_slice(b"/"),
        }

        match request.version() {
            Version::HTTP_11 => dst.put_slice(b" HTTP/1.1\r\n"),
            Version::HTTP_10 => dst.put_slice(b" HTTP/1.0\r\n"),
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(ErrorKind::Unsupported).into());
            }
        }

        for (header_name, header_value) in request.headers().iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn encode(request: &ClientRequest) -> String {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode(request, &mut dst).unwrap();
        String::from_utf8(dst.to_vec()).unwrap()
    }

    #[test]
    fn get_request_line() {
        let request = ClientRequest::builder().get("/index.html").build().unwrap();
        assert_eq!(encode(&request), "GET /index.html HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn keeps_query_in_target() {
        let request = ClientRequest::builder().get("/search?q=1&r=2").build().unwrap();
        assert_eq!(encode(&request), "GET /search?q=1&r=2 HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn writes_headers_verbatim() {
        let request = ClientRequest::builder()
            .post("/submit")
            .header("host", "example.com:80")
            .header("content-length", "5")
            .build()
            .unwrap();

        let expected = indoc! {"
            POST /submit HTTP/1.1\r
            host: example.com:80\r
            content-length: 5\r
            \r
        "};
        assert_eq!(encode(&request), expected);
    }

    #[test]
    fn no_automatic_framing_headers() {
        let request = ClientRequest::builder().post("/data").body("12345").build().unwrap();
        let encoded = encode(&request);
        assert!(!encoded.to_ascii_lowercase().contains("content-length"));
        assert!(!encoded.to_ascii_lowercase().contains("transfer-encoding"));
    }
}
