//! Client configuration types.

use std::time::Duration;

use courier_core::{ArrayEncoding, ParameterEncoding};

use crate::middleware::LogLevel;

/// Configuration shared by [`crate::Client`] and [`crate::HyperClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Prefix of every route, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Headers sent with every request; per-call headers win.
    pub headers: Vec<(String, String)>,
    /// Body encoding for verbs that carry a body.
    pub parameter_encoding: ParameterEncoding,
    /// How list parameters are URL-encoded.
    pub array_encoding: ArrayEncoding,
    /// Request timeout duration.
    pub timeout: Duration,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
    /// Keypath used by collection decoding when the call names none.
    pub default_collection_keypath: Option<String>,
    /// Request logging verbosity.
    pub log_level: LogLevel,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            headers: Vec::new(),
            parameter_encoding: ParameterEncoding::default(),
            array_encoding: ArrayEncoding::default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            default_collection_keypath: None,
            log_level: LogLevel::Off,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    headers: Vec<(String, String)>,
    parameter_encoding: Option<ParameterEncoding>,
    array_encoding: Option<ArrayEncoding>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
    default_collection_keypath: Option<String>,
    log_level: Option<LogLevel>,
}

impl ClientConfigBuilder {
    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body encoding.
    #[must_use]
    pub const fn parameter_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.parameter_encoding = Some(encoding);
        self
    }

    /// Set the list parameter encoding.
    #[must_use]
    pub const fn array_encoding(mut self, arrays: ArrayEncoding) -> Self {
        self.array_encoding = Some(arrays);
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set the default collection keypath, e.g. `"objects"`.
    #[must_use]
    pub fn default_collection_keypath(mut self, keypath: impl Into<String>) -> Self {
        self.default_collection_keypath = Some(keypath.into());
        self
    }

    /// Set the logging verbosity.
    #[must_use]
    pub const fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            headers: self.headers,
            parameter_encoding: self
                .parameter_encoding
                .unwrap_or(defaults.parameter_encoding),
            array_encoding: self.array_encoding.unwrap_or(defaults.array_encoding),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
            default_collection_keypath: self.default_collection_keypath,
            log_level: self.log_level.unwrap_or(defaults.log_level),
        }
    }
}
