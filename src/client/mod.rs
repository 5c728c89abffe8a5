//! The public client: origin configuration, connection pool and send
//! loop.
//!
//! # Components
//!
//! - [`Client`]: immutable after construction — the origin (scheme, host,
//!   port), a [`ClientConfig`] and the owned connection pool
//! - [`ClientConfig`] / [`PoolSize`]: the enumerated options with their
//!   defaults
//! - [`ClientStream`]: the plain-TCP or TLS transport under a pooled
//!   connection
//!
//! # Send loop
//!
//! `send` borrows a connection, serializes the request and parses one
//! response, each phase under its own deadline. A connection-level
//! failure disposes the connection and transparently re-enters the loop;
//! the common case is a pooled connection the peer closed between uses.
//! The loop terminates when an exchange succeeds or when acquiring a
//! connection fails (typically via the borrow timeout).

mod config;
mod connector;
mod error;
mod pool;

pub use config::{ClientConfig, ClientConfigBuilder, PoolSize};
pub use connector::ClientStream;
pub use error::{AcquireError, BuildError, ConnectError, SendRequestError};

use http::header::HeaderValue;
use http::Method;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::connector::Connector;
use crate::client::pool::Pool;
use crate::connection::ClientConnection;
use crate::protocol::{ClientRequest, HttpError, Response};
use crate::utils::ensure;

/// The fixed identifier stamped into every request's `User-Agent`.
pub const USER_AGENT: &str = concat!("micro-client/", env!("CARGO_PKG_VERSION"));

/// An HTTP/1.1 client for a single origin.
///
/// The client owns a bounded pool of persistent connections to one
/// `http` or `https` origin and is cheap to share behind an `Arc`;
/// `send` takes `&self` and any number of requests may be in flight
/// concurrently, each on its own pooled connection.
pub struct Client {
    host: String,
    port: u16,
    secure: bool,
    host_header: HeaderValue,
    config: ClientConfig,
    connector: Connector,
    pool: Pool<ClientConnection>,
}

impl Client {
    /// Creates a client for `url` with the default configuration.
    ///
    /// `url` must be absolute with scheme `http` or `https` and a
    /// non-empty host; an explicit port overrides the scheme default
    /// (80/443). The configured minimum of pool connections is opened
    /// eagerly; any factory failure aborts construction.
    pub async fn new(url: &str) -> Result<Client, BuildError> {
        Self::with_config(url, ClientConfig::default()).await
    }

    /// Creates a client for `url` with the given configuration.
    pub async fn with_config(url: &str, config: ClientConfig) -> Result<Client, BuildError> {
        let parsed = Url::parse(url).map_err(|e| match e {
            url::ParseError::EmptyHost => BuildError::HostRequired,
            e => BuildError::InvalidUrl { source: e },
        })?;

        let secure = match parsed.scheme() {
            "http" => false,
            "https" => true,
            scheme => return Err(BuildError::InvalidScheme { scheme: scheme.to_string() }),
        };

        let host = parsed.host_str().ok_or(BuildError::HostRequired)?.to_string();
        let port = parsed.port().unwrap_or(if secure { 443 } else { 80 });

        let size = config.pool_size;
        ensure!(size.is_valid(), BuildError::InvalidPoolSize { min: size.min(), max: size.max() });

        let authority = format!("{host}:{port}");
        // the url crate only yields registered names and IP literals here,
        // all of which are valid header characters
        let host_header = HeaderValue::from_str(&authority).unwrap();

        let connector = Connector::new(host.clone(), port, secure, &config)?;

        let pool = Pool::new(size);
        pool.init(|| connector.connect()).await?;

        info!(host = %host, port, tls = secure, "client ready");
        Ok(Client { host, port, secure, host_header, config, connector, pool })
    }

    /// The origin host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The origin port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the origin is reached over TLS.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Sends one request and returns the parsed response.
    ///
    /// The outgoing `Host` header is overwritten with the configured
    /// `host:port` authority and `User-Agent` with [`USER_AGENT`],
    /// regardless of any prior value.
    ///
    /// When the request carries an upgrade handler, the handler is
    /// invoked with the response and the raw stream; afterwards the
    /// stream is closed gracefully and the connection disposed — its
    /// protocol state is no longer HTTP, so it never returns to the
    /// pool.
    pub async fn send(&self, request: &mut ClientRequest) -> Result<Response, SendRequestError> {
        loop {
            let deadline = Instant::now() + self.config.borrow_timeout;
            let mut conn = self.pool.acquire(|| self.connector.connect(), deadline).await?;

            request.set_host(self.host_header.clone());
            request.set_user_agent(HeaderValue::from_static(USER_AGENT));

            match self.exchange(&mut conn, request).await {
                Ok(response) => {
                    if request.is_upgrade() {
                        self.pool.close(conn);
                    } else {
                        self.pool.release(conn);
                    }
                    debug!(status = %response.status(), "request completed");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(cause = %e, "exchange failed, disposing connection and retrying");
                    self.pool.close(conn);
                }
            }
        }
    }

    /// One serialize→parse exchange on a borrowed connection, including
    /// the upgrade handoff and graceful close when an upgrade handler is
    /// present.
    async fn exchange(&self, conn: &mut ClientConnection, request: &mut ClientRequest) -> Result<Response, HttpError> {
        conn.serialize(request, Instant::now() + self.config.serialize_timeout).await?;

        let head_request = request.method() == &Method::HEAD;
        let response = conn.parse(head_request, Instant::now() + self.config.parse_timeout).await?;

        if let Some(handler) = request.upgrade_mut() {
            handler(&response, conn.upgraded()).await?;
            conn.shutdown(Instant::now() + self.config.close_connection_timeout).await?;
        }

        Ok(response)
    }
}
