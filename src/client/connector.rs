//! The connection factory: transport construction for one origin.
//!
//! Constructing a connection has three steps, each under its own
//! deadline:
//!
//! 1. resolve `host:port` (address-resolution timeout)
//! 2. TCP connect, then for `https` a TLS handshake (connection timeout)
//! 3. bind the serializer and parser with their configured buffer sizes

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::{timeout_at, Instant};
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig as TlsConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::{debug, trace};

use crate::client::config::ClientConfig;
use crate::client::error::ConnectError;
use crate::connection::ClientConnection;

/// Builds new [`ClientConnection`]s for a fixed origin.
pub(crate) struct Connector {
    host: String,
    port: u16,
    tls: Option<(TlsConnector, ServerName<'static>)>,
    address_resolution_timeout: Duration,
    connection_timeout: Duration,
    parser_buffer_size: usize,
    serializer_buffer_size: usize,
}

impl Connector {
    pub(crate) fn new(host: String, port: u16, secure: bool, config: &ClientConfig) -> Result<Self, ConnectError> {
        let tls = if secure {
            let mut root_store = RootCertStore::empty();
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

            let tls_config = TlsConfig::builder().with_root_certificates(root_store).with_no_client_auth();

            let server_name =
                ServerName::try_from(host.clone()).map_err(|_| ConnectError::InvalidServerName)?;

            Some((TlsConnector::from(Arc::new(tls_config)), server_name))
        } else {
            None
        };

        Ok(Self {
            host,
            port,
            tls,
            address_resolution_timeout: config.address_resolution_timeout,
            connection_timeout: config.connection_timeout,
            parser_buffer_size: config.parser_buffer_size,
            serializer_buffer_size: config.serializer_buffer_size,
        })
    }

    /// Constructs and opens one connection to the origin.
    ///
    /// Any step's failure aborts the call with the underlying error;
    /// partially constructed transports are dropped and thereby closed.
    pub(crate) async fn connect(&self) -> Result<ClientConnection, ConnectError> {
        let deadline = Instant::now() + self.address_resolution_timeout;
        let mut resolved = match timeout_at(deadline, lookup_host((self.host.as_str(), self.port))).await {
            Ok(result) => result.map_err(ConnectError::resolve)?,
            Err(_) => return Err(ConnectError::ResolveTimeout),
        };
        let addr = resolved.next().ok_or(ConnectError::NoAddress)?;
        trace!(%addr, "resolved origin address");

        let deadline = Instant::now() + self.connection_timeout;
        let stream = match timeout_at(deadline, self.open(addr)).await {
            Ok(result) => result?,
            Err(_) => return Err(ConnectError::OpenTimeout),
        };
        debug!(host = %self.host, port = self.port, tls = self.tls.is_some(), "opened connection to origin");

        Ok(ClientConnection::new(stream, self.parser_buffer_size, self.serializer_buffer_size))
    }

    async fn open(&self, addr: SocketAddr) -> Result<ClientStream, ConnectError> {
        let tcp = TcpStream::connect(addr).await.map_err(ConnectError::connect)?;

        match &self.tls {
            Some((connector, server_name)) => {
                let tls = connector.connect(server_name.clone(), tcp).await.map_err(ConnectError::tls)?;
                Ok(ClientStream::Tls(Box::new(tls)))
            }
            None => Ok(ClientStream::Plain(tcp)),
        }
    }
}

/// The duplex byte transport under a connection: plain TCP or TLS.
pub enum ClientStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for ClientStream {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            ClientStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            ClientStream::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for ClientStream {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            ClientStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            ClientStream::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            ClientStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            ClientStream::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            ClientStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            ClientStream::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}
