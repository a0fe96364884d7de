//! Calls one endpoint twice through an in-memory cache.
//!
//! ```text
//! RAPIDAPI_KEY=... RAPIDAPI_HOST=... RAPIDAPI_BASE_URL=https://... \
//!     cargo run --example cached_call -- /some/endpoint
//! ```

use std::sync::Arc;

use apicache::{ApiClient, CallOptions, ClientConfig, MemoryStore, TracingLogger};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let uri = std::env::args().nth(1).unwrap_or_else(|| "/".to_owned());
    let config = ClientConfig::from_env()?;
    let client = ApiClient::from_config(config)?
        .with_cache(Arc::new(MemoryStore::new()))
        .with_logger(Arc::new(TracingLogger));

    for attempt in 1..=2 {
        match client.call(CallOptions::get(uri.as_str())).await {
            Ok(body) => println!("#{attempt}: {body}"),
            Err(e) => println!("#{attempt}: error {}", e.error_value()),
        }
    }
    Ok(())
}
