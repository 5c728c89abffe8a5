//! Client configuration.

use std::time::Duration;

/// Inclusive bounds of the connection pool.
///
/// `min` connections are opened eagerly at construction; the pool grows
/// lazily up to `max` under load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSize {
    min: usize,
    max: usize,
}

impl PoolSize {
    /// Creates pool bounds. Validated (`min <= max`) when the client is
    /// built.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

impl Default for PoolSize {
    fn default() -> Self {
        Self { min: 5, max: 10 }
    }
}

/// Configuration of a [`Client`](crate::client::Client).
///
/// Every blocking phase of an exchange derives an absolute deadline from
/// its configured duration at the moment the phase starts; there is no
/// global per-request deadline.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) pool_size: PoolSize,
    pub(crate) parser_buffer_size: usize,
    pub(crate) serializer_buffer_size: usize,
    pub(crate) address_resolution_timeout: Duration,
    pub(crate) connection_timeout: Duration,
    pub(crate) borrow_timeout: Duration,
    pub(crate) parse_timeout: Duration,
    pub(crate) serialize_timeout: Duration,
    pub(crate) close_connection_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pool_size: PoolSize::default(),
            parser_buffer_size: 4096,
            serializer_buffer_size: 4096,
            address_resolution_timeout: Duration::from_secs(60),
            connection_timeout: Duration::from_secs(60),
            borrow_timeout: Duration::from_secs(300),
            parse_timeout: Duration::from_secs(300),
            serialize_timeout: Duration::from_secs(300),
            close_connection_timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn pool_size(&self) -> PoolSize {
        self.pool_size
    }

    pub fn parser_buffer_size(&self) -> usize {
        self.parser_buffer_size
    }

    pub fn serializer_buffer_size(&self) -> usize {
        self.serializer_buffer_size
    }

    pub fn address_resolution_timeout(&self) -> Duration {
        self.address_resolution_timeout
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    pub fn borrow_timeout(&self) -> Duration {
        self.borrow_timeout
    }

    pub fn parse_timeout(&self) -> Duration {
        self.parse_timeout
    }

    pub fn serialize_timeout(&self) -> Duration {
        self.serialize_timeout
    }

    pub fn close_connection_timeout(&self) -> Duration {
        self.close_connection_timeout
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    pool_size: Option<PoolSize>,
    parser_buffer_size: Option<usize>,
    serializer_buffer_size: Option<usize>,
    address_resolution_timeout: Option<Duration>,
    connection_timeout: Option<Duration>,
    borrow_timeout: Option<Duration>,
    parse_timeout: Option<Duration>,
    serialize_timeout: Option<Duration>,
    close_connection_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Sets the pool bounds.
    pub fn pool_size(mut self, size: PoolSize) -> Self {
        self.pool_size = Some(size);
        self
    }

    /// Sets the parser read-buffer size in bytes.
    pub fn parser_buffer_size(mut self, size: usize) -> Self {
        self.parser_buffer_size = Some(size);
        self
    }

    /// Sets the serializer write-buffer size in bytes.
    pub fn serializer_buffer_size(mut self, size: usize) -> Self {
        self.serializer_buffer_size = Some(size);
        self
    }

    /// Sets the deadline for DNS resolution during connection setup.
    pub fn address_resolution_timeout(mut self, timeout: Duration) -> Self {
        self.address_resolution_timeout = Some(timeout);
        self
    }

    /// Sets the deadline for opening (connect plus TLS handshake) a new
    /// connection.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    /// Sets the maximum time to acquire a pooled connection.
    pub fn borrow_timeout(mut self, timeout: Duration) -> Self {
        self.borrow_timeout = Some(timeout);
        self
    }

    /// Sets the deadline for parsing one full response.
    pub fn parse_timeout(mut self, timeout: Duration) -> Self {
        self.parse_timeout = Some(timeout);
        self
    }

    /// Sets the deadline for serializing one full request.
    pub fn serialize_timeout(mut self, timeout: Duration) -> Self {
        self.serialize_timeout = Some(timeout);
        self
    }

    /// Sets the deadline for the post-upgrade graceful stream close.
    pub fn close_connection_timeout(mut self, timeout: Duration) -> Self {
        self.close_connection_timeout = Some(timeout);
        self
    }

    /// Builds the configuration, filling unset options with their
    /// defaults.
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            pool_size: self.pool_size.unwrap_or(defaults.pool_size),
            parser_buffer_size: self.parser_buffer_size.unwrap_or(defaults.parser_buffer_size),
            serializer_buffer_size: self.serializer_buffer_size.unwrap_or(defaults.serializer_buffer_size),
            address_resolution_timeout: self
                .address_resolution_timeout
                .unwrap_or(defaults.address_resolution_timeout),
            connection_timeout: self.connection_timeout.unwrap_or(defaults.connection_timeout),
            borrow_timeout: self.borrow_timeout.unwrap_or(defaults.borrow_timeout),
            parse_timeout: self.parse_timeout.unwrap_or(defaults.parse_timeout),
            serialize_timeout: self.serialize_timeout.unwrap_or(defaults.serialize_timeout),
            close_connection_timeout: self.close_connection_timeout.unwrap_or(defaults.close_connection_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ClientConfig::default();
        assert_eq!(config.pool_size(), PoolSize::new(5, 10));
        assert_eq!(config.parser_buffer_size(), 4096);
        assert_eq!(config.serializer_buffer_size(), 4096);
        assert_eq!(config.address_resolution_timeout(), Duration::from_secs(60));
        assert_eq!(config.connection_timeout(), Duration::from_secs(60));
        assert_eq!(config.borrow_timeout(), Duration::from_secs(300));
        assert_eq!(config.parse_timeout(), Duration::from_secs(300));
        assert_eq!(config.serialize_timeout(), Duration::from_secs(300));
        assert_eq!(config.close_connection_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn builder_overrides_and_fills_defaults() {
        let config = ClientConfig::builder()
            .pool_size(PoolSize::new(1, 2))
            .borrow_timeout(Duration::from_millis(100))
            .build();

        assert_eq!(config.pool_size(), PoolSize::new(1, 2));
        assert_eq!(config.borrow_timeout(), Duration::from_millis(100));
        assert_eq!(config.parse_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn inverted_bounds_are_detected() {
        assert!(PoolSize::new(2, 2).is_valid());
        assert!(!PoolSize::new(3, 2).is_valid());
    }
}
