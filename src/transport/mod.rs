//! Transports — the component that actually talks to the remote API.
//!
//! A [`Transport`] executes one [`ApiRequest`] and hands back whatever the
//! remote answered, including non-2xx statuses. Classifying the outcome is
//! the client's job, so every transport reports failures the same way.
//!
//! ## Implementations
//!
//! - [`ReqwestTransport`] — `reqwest` with rustls.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

use crate::http::request::InvalidParams;
use crate::http::{ApiRequest, ApiResponse, StatusCode};

pub mod reqwest;

pub use self::reqwest::ReqwestTransport;

/// Errors that end a call without a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote answered with a non-2xx status.
    #[error("remote returned {status}")]
    Status { status: StatusCode, body: Value },

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error(transparent)]
    InvalidParams(#[from] InvalidParams),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] ::reqwest::Error),
}

impl TransportError {
    /// The structured value reported to loggers and callers.
    ///
    /// Status failures carry the remote's error body as-is; everything else
    /// is wrapped as `{"message": "<display text>"}`.
    pub fn error_value(&self) -> Value {
        match self {
            Self::Status { body, .. } => body.clone(),
            other => json!({ "message": other.to_string() }),
        }
    }

    /// The remote status, for status failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Executes outbound requests.
///
/// Implementations must be `Send + Sync` because one transport is shared by
/// every call on a client. Cancellation is drop-based: dropping the returned
/// future must abort the exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the remote's answer, whatever its status.
    async fn request(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Loopback server that answers exactly one connection with a canned reply.

    use std::net::SocketAddr;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Starts the server; the receiver yields the raw request head it saw.
    pub async fn serve_once(reply: &'static [u8]) -> (SocketAddr, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut seen = Vec::new();
            let mut chunk = [0u8; 1024];
            while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                seen.extend_from_slice(&chunk[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&seen).into_owned());
            stream.write_all(reply).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        (addr, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_surface_the_body() {
        let err = TransportError::Status {
            status: StatusCode::NOT_FOUND,
            body: json!({ "message": "Endpoint '/x' does not exist" }),
        };
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.error_value()["message"], "Endpoint '/x' does not exist");
    }

    #[test]
    fn other_errors_are_wrapped() {
        let err = TransportError::Timeout(Duration::from_secs(2));
        assert_eq!(err.status(), None);
        assert_eq!(err.error_value(), json!({ "message": "request timed out after 2s" }));
    }
}
