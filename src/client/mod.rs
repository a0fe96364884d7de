//! The API client and its cache-aside call path.
//!
//! [`ApiClient::call`] performs at most one cache read, at most one transport
//! round trip and at most one cache write, strictly in that order:
//!
//! 1. Without a store, the transport is called directly.
//! 2. With a store, the [`CacheKey`] is derived and looked up. A hit is
//!    returned as-is without touching the transport.
//! 3. On a miss the transport is called. Only 2xx answers are written back;
//!    failures are never cached.
//!
//! Store faults never fail a call: a read error counts as a miss and a write
//! error is logged and dropped. Only [`TransportError`] reaches the caller.
//!
//! Concurrent identical calls are not coalesced; each may miss and write the
//! same key, and the last write wins. Dropping a call future before the
//! transport completes leaves the store untouched.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::config::ClientConfig;
use crate::http::{ApiRequest, Method};
use crate::key::{CacheKey, CallDescriptor, KeyDeriver, KeyHasher};
use crate::logger::Logger;
use crate::transport::{Transport, TransportError};

/// Outcome of a call: the response body or the transport failure, never both.
pub type CallResult<T = Value> = Result<T, TransportError>;

/// What to call: method (GET by default), URI relative to the base URL, and
/// optional query parameters.
///
/// # Examples
///
/// ```
/// use apicache::client::CallOptions;
/// use apicache::http::Method;
/// use serde_json::json;
///
/// let options = CallOptions::get("/search").params(json!({ "q": "rust" }));
/// assert_eq!(options.method(), &Method::Get);
/// assert_eq!(CallOptions::new("/x").method(), &Method::Get);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CallOptions {
    method: Option<Method>,
    uri: String,
    params: Option<Value>,
}

impl CallOptions {
    /// A call with the default method.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            method: None,
            uri: uri.into(),
            params: None,
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(uri).with_method(Method::Get)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(uri).with_method(Method::Post)
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// The effective method.
    pub fn method(&self) -> &Method {
        const DEFAULT: &Method = &Method::Get;
        self.method.as_ref().unwrap_or(DEFAULT)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// A client for one API credential and base URL.
///
/// Cheap to clone; clones share the configuration, transport, store and logger.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use apicache::cache::MemoryStore;
/// use apicache::client::{ApiClient, CallOptions};
/// use apicache::config::ClientConfig;
/// use apicache::logger::TracingLogger;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::from_env()?;
///     let client = ApiClient::from_config(config)?
///         .with_cache(Arc::new(MemoryStore::new()))
///         .with_logger(Arc::new(TracingLogger));
///
///     let body = client
///         .call(CallOptions::get("/search").params(json!({ "term": "drip" })))
///         .await?;
///     println!("{body}");
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn CacheStore>>,
    logger: Option<Arc<dyn Logger>>,
    keys: KeyDeriver,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url())
            .field("cache", &self.cache.is_some())
            .field("logger", &self.logger.is_some())
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client without cache or logger.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let keys = KeyDeriver::new(config.key_layout());
        Self {
            config: Arc::new(config),
            transport,
            cache: None,
            logger: None,
            keys,
        }
    }

    /// Creates a client over a [`ReqwestTransport`](crate::transport::ReqwestTransport)
    /// honouring the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the HTTP client cannot be initialised.
    pub fn from_config(config: ClientConfig) -> Result<Self, TransportError> {
        let transport = crate::transport::ReqwestTransport::new(config.timeout())?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Enables caching through `store`.
    #[must_use]
    pub fn with_cache(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(store);
        self
    }

    /// Attaches an observability sink.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Replaces the hash function used for cache keys.
    #[must_use]
    pub fn with_key_hasher(mut self, hasher: Arc<dyn KeyHasher>) -> Self {
        self.keys = self.keys.with_hasher(hasher);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The key `options` would be cached under.
    pub fn cache_key(&self, options: &CallOptions) -> CacheKey {
        let target = self.config.resolve(options.uri());
        self.derive_key(options.method(), &target, options.params.as_ref())
    }

    fn derive_key(&self, method: &Method, target: &str, params: Option<&Value>) -> CacheKey {
        let descriptor = CallDescriptor::new(self.config.api_key(), target)
            .method(method)
            .params(params);
        self.keys.derive(&descriptor)
    }

    /// Performs one call, consulting the cache when one is configured.
    ///
    /// # Errors
    ///
    /// Returns the [`TransportError`] of a failed exchange, including
    /// [`TransportError::Status`] for non-2xx answers. Cache faults are never
    /// returned.
    pub async fn call(&self, options: CallOptions) -> CallResult<Value> {
        let method = options.method().clone();
        self.notify(
            &format!("Calling API with method: {method}, URI: {}", options.uri),
            || json!({ "params": options.params }),
        );

        let target = self.config.resolve(&options.uri);
        let request = ApiRequest::new(method, target)
            .params(options.params)
            .headers(self.config.headers().clone());

        let Some(cache) = self.cache.as_ref() else {
            return self.dispatch(&request).await;
        };

        let key = self.derive_key(request.method(), request.url(), request.parameters());
        match cache.get(key.as_str()).await {
            Ok(Some(cached)) => {
                debug!(cache_key = %key, "cache hit");
                self.notify("Cache hit", || json!({ "cacheKey": key.as_str() }));
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!(cache_key = %key, error = %e, "cache read failed — treating as miss"),
        }

        debug!(cache_key = %key, "cache miss");
        self.notify("Cache miss", || json!({ "cacheKey": key.as_str() }));

        let body = self.dispatch(&request).await?;
        if let Err(e) = cache.set(key.as_str(), body.clone()).await {
            warn!(cache_key = %key, error = %e, "cache write failed — response not cached");
        }
        Ok(body)
    }

    /// Like [`call`](Self::call), decoding the body into `T`.
    ///
    /// # Errors
    ///
    /// As [`call`](Self::call), plus [`TransportError::Decode`] when the body
    /// does not match `T`.
    pub async fn call_as<T: DeserializeOwned>(&self, options: CallOptions) -> CallResult<T> {
        let body = self.call(options).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Runs the transport and classifies its answer.
    async fn dispatch(&self, request: &ApiRequest) -> CallResult<Value> {
        self.notify("Making request", || {
            json!({
                "config": {
                    "method": request.method().as_str(),
                    "url": request.url(),
                    "params": request.parameters(),
                }
            })
        });
        debug!(method = %request.method(), url = request.url(), "dispatching request");

        let outcome = match self.transport.request(request).await {
            Ok(response) if response.status().is_success() => Ok(response.into_body()),
            Ok(response) => Err(TransportError::Status {
                status: response.status(),
                body: response.into_body(),
            }),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(body) => {
                self.notify("Request successful", || json!({ "response": body }));
                Ok(body)
            }
            Err(e) => {
                debug!(url = request.url(), error = %e, "request failed");
                self.notify("Request failed", || json!({ "error": e.error_value() }));
                Err(e)
            }
        }
    }

    fn notify(&self, message: &str, data: impl FnOnce() -> Value) {
        if let Some(logger) = self.logger.as_ref() {
            logger.info(message, Some(&data()));
        }
    }
}
