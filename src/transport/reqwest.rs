//! The network transport, backed by `reqwest` with rustls.
//!
//! Framing, chunked decoding and TLS are left to `reqwest`; malformed
//! responses surface as [`TransportError::Reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{Transport, TransportError};
use crate::http::response::decode_body;
use crate::http::{ApiRequest, ApiResponse, Headers};

/// A [`Transport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ::reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Builds a client with an optional whole-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Reqwest`] if the TLS backend cannot be initialised.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = ::reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            timeout,
        })
    }

    /// Wraps an existing client, keeping its configuration.
    pub fn from_client(client: ::reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    fn classify(&self, err: ::reqwest::Error) -> TransportError {
        match self.timeout {
            Some(limit) if err.is_timeout() => TransportError::Timeout(limit),
            _ => TransportError::Reqwest(err),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = ::reqwest::Method::from_bytes(request.method().as_str().as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method().to_string()))?;
        let pairs = request.query_pairs()?;

        let mut builder = self.client.request(method, request.url()).query(&pairs);
        for (name, value) in request.header_map().iter() {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        debug!(url = %response.url(), status, "response received");

        let mut headers = Headers::with_capacity(response.headers().len());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str(), value);
            }
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        Ok(ApiResponse::new(status, decode_body(&bytes)).with_headers(headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, StatusCode};
    use crate::transport::testing::serve_once;
    use serde_json::json;

    #[tokio::test]
    async fn plain_http_round_trip() {
        let (addr, seen) = serve_once(
            b"HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"ok\":true}",
        )
        .await;

        let mut headers = Headers::new();
        headers.insert("X-RapidAPI-Host", "api.example.com");
        let request = ApiRequest::new(Method::Post, format!("http://{addr}/items"))
            .params(Some(json!({ "name": "a b" })))
            .headers(headers);

        let transport = ReqwestTransport::new(Some(Duration::from_secs(5))).unwrap();
        let response = transport.request(&request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body(), &json!({ "ok": true }));

        let head = seen.await.unwrap().to_ascii_lowercase();
        assert!(head.starts_with("post /items?name=a+b http/1.1\r\n"));
        assert!(head.contains("x-rapidapi-host: api.example.com\r\n"));
    }

    #[tokio::test]
    async fn oversized_chunk_is_an_error() {
        let (addr, _seen) = serve_once(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nffffffffffffffff\r\nabc\r\n0\r\n\r\n",
        )
        .await;

        let request = ApiRequest::new(Method::Get, format!("http://{addr}/"));
        let transport = ReqwestTransport::new(Some(Duration::from_secs(5))).unwrap();
        let err = transport.request(&request).await.unwrap_err();
        assert!(matches!(err, TransportError::Reqwest(_)), "{err:?}");
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn slow_remote_maps_to_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let limit = Duration::from_millis(100);
        let request = ApiRequest::new(Method::Get, format!("http://{addr}/"));
        let transport = ReqwestTransport::new(Some(limit)).unwrap();
        let err = transport.request(&request).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(d) if d == limit), "{err:?}");
        server.abort();
    }
}
