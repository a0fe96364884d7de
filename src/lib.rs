//! # apicache
//!
//! A cache-aside client for HTTP APIs: every call is reduced to a stable key
//! (credential, method, resolved URL, parameters), looked up in a pluggable
//! store, and only sent over the network on a miss. Successful responses are
//! written back; failures never are.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use apicache::{ApiClient, CallOptions, ClientConfig, MemoryStore};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder("my-key", "api.example.com", "https://api.example.com")
//!         .build()?;
//!     let client = ApiClient::from_config(config)?.with_cache(Arc::new(MemoryStore::new()));
//!
//!     let options = CallOptions::get("/search").params(json!({ "term": "drip" }));
//!     let fresh = client.call(options.clone()).await?;
//!     let cached = client.call(options).await?; // served from the store
//!     assert_eq!(fresh, cached);
//!     Ok(())
//! }
//! ```

// ── Call path ─────────────────────────────────────────────────────────────────
pub mod client;
pub mod key;

// ── Collaborators ─────────────────────────────────────────────────────────────
pub mod cache;
pub mod logger;
pub mod transport;

// ── Supporting types ──────────────────────────────────────────────────────────
pub mod config;
pub mod http;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::{CacheError, CacheStore, MemoryStore};
pub use client::{ApiClient, CallOptions, CallResult};
pub use config::{ClientConfig, ConfigError};
pub use http::{ApiRequest, ApiResponse, Headers, Method, StatusCode};
pub use key::{CacheKey, CallDescriptor, KeyDeriver, KeyLayout, derive_key, structural_hash};
pub use logger::{Logger, TracingLogger};
pub use transport::{ReqwestTransport, Transport, TransportError};
