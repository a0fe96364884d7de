//! Client configuration — assembled once, immutable afterwards.
//!
//! A [`ClientConfig`] carries the API credential, the host header value, the
//! base URL every call URI is resolved against, transport settings and the
//! cache key layout. It is built through [`ClientConfigBuilder`] or from the
//! environment with [`ClientConfig::from_env`].

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::http::Headers;
use crate::key::KeyLayout;

/// Environment variable holding the API key.
pub const ENV_KEY: &str = "RAPIDAPI_KEY";
/// Environment variable holding the API host header value.
pub const ENV_HOST: &str = "RAPIDAPI_HOST";
/// Environment variable holding the base URL.
pub const ENV_BASE_URL: &str = "RAPIDAPI_BASE_URL";
/// Optional environment variable with a request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "RAPIDAPI_TIMEOUT_SECS";

/// Errors produced while assembling a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Immutable client configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use apicache::config::ClientConfig;
///
/// let config = ClientConfig::builder("key", "api.example.com", "https://api.example.com/v1/")
///     .timeout(Duration::from_secs(10))
///     .header("Accept-Language", "en")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.resolve("/search"), "https://api.example.com/v1/search");
/// assert_eq!(config.headers().get("x-rapidapi-host"), Some("api.example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_key: String,
    api_host: String,
    base_url: String,
    timeout: Option<Duration>,
    headers: Headers,
    key_layout: KeyLayout,
}

impl ClientConfig {
    /// Starts a builder with the three required settings.
    pub fn builder(
        api_key: impl Into<String>,
        api_host: impl Into<String>,
        base_url: impl Into<String>,
    ) -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_key: api_key.into(),
            api_host: api_host.into(),
            base_url: base_url.into(),
            timeout: None,
            extra_headers: Headers::new(),
            key_layout: KeyLayout::default(),
        }
    }

    /// Reads `RAPIDAPI_KEY`, `RAPIDAPI_HOST`, `RAPIDAPI_BASE_URL` and the
    /// optional `RAPIDAPI_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingVar`] — a required variable is unset.
    /// - [`ConfigError::Invalid`] — the timeout is not a whole number of seconds.
    /// - [`ConfigError::InvalidBaseUrl`] — the base URL does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));

        let mut builder = Self::builder(require(ENV_KEY)?, require(ENV_HOST)?, require(ENV_BASE_URL)?);
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    /// The credential; also the first component of every cache key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn key_layout(&self) -> KeyLayout {
        self.key_layout
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Resolves a call URI against the base URL.
    ///
    /// Absolute URIs are returned unchanged. Otherwise one `/` joins the base
    /// (trailing slashes trimmed) and the URI (leading slashes trimmed).
    pub fn resolve(&self, uri: &str) -> String {
        if is_absolute(uri) {
            return uri.to_owned();
        }
        if uri.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            uri.trim_start_matches('/')
        )
    }
}

fn is_absolute(uri: &str) -> bool {
    match uri.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => uri.starts_with("//"),
    }
}

/// Fluent builder for [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    api_key: String,
    api_host: String,
    base_url: String,
    timeout: Option<Duration>,
    extra_headers: Headers,
    key_layout: KeyLayout,
}

impl ClientConfigBuilder {
    /// Bounds every transport exchange.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a default header. The API credential headers cannot be overridden.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.set(name, value);
        self
    }

    #[must_use]
    pub fn key_layout(mut self, layout: KeyLayout) -> Self {
        self.key_layout = layout;
        self
    }

    /// Validates the base URL and freezes the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL does not parse.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })?;

        let mut headers = self.extra_headers;
        headers.set("X-RapidAPI-Host", self.api_host.clone());
        headers.set("X-RapidAPI-Key", self.api_key.clone());
        if !headers.contains("content-type") {
            headers.set("Content-Type", "application/json");
        }

        Ok(ClientConfig {
            api_key: self.api_key,
            api_host: self.api_host,
            base_url: self.base_url,
            timeout: self.timeout,
            headers,
            key_layout: self.key_layout,
        })
    }
}
