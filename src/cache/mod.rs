//! Caching layer — the store seam consulted by the client.
//!
//! The client only ever calls [`CacheStore::get`] and [`CacheStore::set`].
//! Eviction, expiry and internal locking belong to the store.
//!
//! ## Implementations
//!
//! - [`MemoryStore`] — process-local map, shared behind an `Arc`.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

/// Errors a store may report.
///
/// The client never surfaces these: a failed read counts as a miss and a
/// failed write is logged and dropped.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("stored value could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A key-value store for successful responses.
///
/// Implementations must be `Send + Sync`: one store handle is shared by
/// every in-flight call on a client.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: Value) -> Result<(), CacheError>;
}
