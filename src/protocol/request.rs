//! The outgoing HTTP request.
//!
//! [`ClientRequest`] wraps the standard `http::Request` vocabulary types
//! with a fully buffered byte body and an optional protocol-upgrade
//! handler. The request target must be in origin form (`/path?query`);
//! the client owns the origin and overwrites the `Host` and `User-Agent`
//! headers before serialization.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request, Uri, Version};

use crate::connection::UpgradedIo;
use crate::protocol::{Response, UpgradeError};

/// The future returned by an upgrade handler.
pub type UpgradeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), UpgradeError>> + Send + 'a>>;

/// A caller-supplied handler invoked after a successful protocol upgrade.
///
/// The handler receives the upgrade response and the raw byte stream and
/// runs the post-upgrade protocol to completion; when it returns, the
/// client closes the stream gracefully and disposes the connection.
///
/// The handler is `FnMut` rather than `FnOnce`: when an upgrade attempt
/// fails at the connection level the send loop disposes the connection
/// and replays the whole exchange, invoking the handler again.
pub type OnUpgrade = Box<dyn for<'a> FnMut(&'a Response, UpgradedIo<'a>) -> UpgradeFuture<'a> + Send + Sync>;

/// An HTTP request ready to be sent by the client.
pub struct ClientRequest {
    head: Request<()>,
    body: Bytes,
    upgrade: Option<OnUpgrade>,
}

impl ClientRequest {
    /// Creates a new request builder.
    pub fn builder() -> ClientRequestBuilder {
        ClientRequestBuilder::new()
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.head.method()
    }

    /// Returns a reference to the request target.
    pub fn target(&self) -> &Uri {
        self.head.uri()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.head.version()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    /// Returns a mutable reference to the request's headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.head.headers_mut()
    }

    /// Returns a reference to the request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns true if this request carries an upgrade handler.
    pub fn is_upgrade(&self) -> bool {
        self.upgrade.is_some()
    }

    pub(crate) fn upgrade_mut(&mut self) -> Option<&mut OnUpgrade> {
        self.upgrade.as_mut()
    }

    /// Overwrites the `Host` header. Called by the client with the
    /// configured origin authority before every serialization.
    pub(crate) fn set_host(&mut self, value: HeaderValue) {
        self.head.headers_mut().insert(http::header::HOST, value);
    }

    /// Overwrites the `User-Agent` header with the fixed identifier.
    pub(crate) fn set_user_agent(&mut self, value: HeaderValue) {
        self.head.headers_mut().insert(http::header::USER_AGENT, value);
    }
}

impl fmt::Debug for ClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRequest")
            .field("method", self.head.method())
            .field("target", self.head.uri())
            .field("version", &self.head.version())
            .field("headers", self.head.headers())
            .field("body_len", &self.body.len())
            .field("upgrade", &self.upgrade.is_some())
            .finish()
    }
}

/// Builder for [`ClientRequest`].
pub struct ClientRequestBuilder {
    inner: http::request::Builder,
    body: Bytes,
    upgrade: Option<OnUpgrade>,
}

impl ClientRequestBuilder {
    fn new() -> Self {
        Self { inner: Request::builder().version(Version::HTTP_11), body: Bytes::new(), upgrade: None }
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.inner = self.inner.method(method);
        self
    }

    /// Sets the request target (origin form, e.g. `/search?q=pool`).
    pub fn target<T>(mut self, target: T) -> Self
    where
        Uri: TryFrom<T>,
        <Uri as TryFrom<T>>::Error: Into<http::Error>,
    {
        self.inner = self.inner.uri(target);
        self
    }

    /// Shorthand for a GET request to `target`.
    pub fn get(self, target: &str) -> Self {
        self.method(Method::GET).target(target)
    }

    /// Shorthand for a POST request to `target`.
    pub fn post(self, target: &str) -> Self {
        self.method(Method::POST).target(target)
    }

    /// Shorthand for a PUT request to `target`.
    pub fn put(self, target: &str) -> Self {
        self.method(Method::PUT).target(target)
    }

    /// Shorthand for a DELETE request to `target`.
    pub fn delete(self, target: &str) -> Self {
        self.method(Method::DELETE).target(target)
    }

    /// Shorthand for a HEAD request to `target`.
    pub fn head(self, target: &str) -> Self {
        self.method(Method::HEAD).target(target)
    }

    /// Appends a header.
    ///
    /// Framing headers are the caller's responsibility: the engine writes
    /// headers verbatim and never inserts `Content-Length` or
    /// `Transfer-Encoding` on its own.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.inner = self.inner.header(key, value);
        self
    }

    /// Sets the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Installs a protocol-upgrade handler; see [`OnUpgrade`].
    pub fn on_upgrade<F>(mut self, handler: F) -> Self
    where
        F: for<'a> FnMut(&'a Response, UpgradedIo<'a>) -> UpgradeFuture<'a> + Send + Sync + 'static,
    {
        self.upgrade = Some(Box::new(handler));
        self
    }

    /// Builds the request, surfacing any accumulated method/target/header
    /// error.
    pub fn build(self) -> Result<ClientRequest, http::Error> {
        let head = self.inner.body(())?;
        Ok(ClientRequest { head, body: self.body, upgrade: self.upgrade })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let request = ClientRequest::builder().get("/index.html").build().unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.target().path(), "/index.html");
        assert_eq!(request.version(), Version::HTTP_11);
        assert!(request.body().is_empty());
        assert!(!request.is_upgrade());
    }

    #[test]
    fn keeps_target_query() {
        let request = ClientRequest::builder().get("/search?q=pool&page=2").build().unwrap();
        assert_eq!(request.target().path(), "/search");
        assert_eq!(request.target().query(), Some("q=pool&page=2"));
    }

    #[test]
    fn collects_headers_and_body() {
        let request = ClientRequest::builder()
            .post("/submit")
            .header("content-type", "text/plain")
            .header("content-length", "5")
            .body("hello")
            .build()
            .unwrap();
        assert_eq!(request.headers().get("content-type").unwrap(), "text/plain");
        assert_eq!(request.body().as_ref(), b"hello");
    }

    #[test]
    fn surfaces_invalid_header() {
        let result = ClientRequest::builder().get("/").header("bad name", "x").build();
        assert!(result.is_err());
    }
}
