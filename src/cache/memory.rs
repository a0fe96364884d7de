//! In-process cache store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{CacheError, CacheStore};

/// A [`CacheStore`] over a `HashMap` guarded by a Tokio `RwLock`.
///
/// Entries live until [`clear`](Self::clear) or until the store is dropped.
///
/// # Examples
///
/// ```
/// use apicache::cache::{CacheStore, MemoryStore};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new();
/// store.set("k", json!({ "data": "success" })).await.unwrap();
/// assert_eq!(store.get("k").await.unwrap(), Some(json!({ "data": "success" })));
/// assert_eq!(store.get("missing").await.unwrap(), None);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", json!(1)).await.unwrap();
        store.set("k", json!(2)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn stored_null_is_a_hit() {
        let store = MemoryStore::new();
        store.set("k", Value::Null).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(Value::Null));
    }

    #[tokio::test]
    async fn clear_empties() {
        let store = MemoryStore::new();
        store.set("a", json!("x")).await.unwrap();
        store.clear().await;
        assert!(store.is_empty().await);
        assert_eq!(store.get("a").await.unwrap(), None);
    }
}
