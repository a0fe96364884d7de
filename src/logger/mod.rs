//! Optional observability sink for call lifecycle events.
//!
//! The client reports five events through a [`Logger`] when one is attached:
//! dispatch, cache hit, cache miss, success and failure. Leaving the logger
//! out changes nothing but the notifications.
//!
//! Independently of this sink, the library emits `tracing` events; consumers
//! wire up their own subscriber.

use serde_json::Value;

/// Receives informational messages with optional structured data.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str, data: Option<&Value>);
}

/// Forwards every message to `tracing::info!` under the `apicache` target.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use apicache::logger::{Logger, TracingLogger};
///
/// let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
/// logger.info("Cache hit", None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str, data: Option<&Value>) {
        match data {
            Some(data) => tracing::info!(target: "apicache", %data, "{message}"),
            None => tracing::info!(target: "apicache", "{message}"),
        }
    }
}
