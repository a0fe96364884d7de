//! API responses as handed back by a transport.

use serde_json::Value;

use super::{Headers, StatusCode};

/// A transport response: status, headers and the decoded body.
///
/// The body is JSON when the payload parses as JSON, a JSON string holding
/// the raw text otherwise, and `null` when empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    headers: Headers,
    body: Value,
}

impl ApiResponse {
    pub fn new(status: impl Into<StatusCode>, body: Value) -> Self {
        Self {
            status: status.into(),
            headers: Headers::new(),
            body,
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

/// Decodes a raw payload into the JSON body representation.
pub fn decode_body(raw: &[u8]) -> Value {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(raw)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(raw).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_decoding() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b" \r\n"), Value::Null);
        assert_eq!(decode_body(b"{\"data\":\"success\"}"), json!({ "data": "success" }));
        assert_eq!(decode_body(b"Not Found"), json!("Not Found"));
    }

    #[test]
    fn into_body_keeps_payload() {
        let response = ApiResponse::new(404, json!({ "message": "gone" }));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().is_empty());
        assert_eq!(response.into_body(), json!({ "message": "gone" }));
    }
}
