//! Outbound API request and its query-string encoding.

use serde_json::Value;

use super::{Headers, Method};

/// One resolved outbound call, ready to hand to a transport.
///
/// `params` follow query-parameter semantics for every method: they are
/// encoded into the URL query string, never into the body.
///
/// # Examples
///
/// ```
/// use apicache::http::{ApiRequest, Method};
/// use serde_json::json;
///
/// let request = ApiRequest::new(Method::Get, "https://api.example.com/search")
///     .params(Some(json!({ "q": "rust", "page": 2 })));
///
/// assert_eq!(request.url(), "https://api.example.com/search");
/// let pairs = request.query_pairs().unwrap();
/// assert_eq!(pairs, vec![("page".to_owned(), "2".to_owned()), ("q".to_owned(), "rust".to_owned())]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    url: String,
    params: Option<Value>,
    headers: Headers,
}

/// Returned by [`ApiRequest::query_pairs`] when the parameters are not a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("query parameters must be a JSON object, got {kind}")]
pub struct InvalidParams {
    pub kind: &'static str,
}

impl ApiRequest {
    /// Creates a request for `url` (absolute, without query string).
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: None,
            headers: Headers::new(),
        }
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn params(mut self, params: Option<Value>) -> Self {
        self.params = params;
        self
    }

    /// Replaces the header map.
    #[must_use]
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parameters(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    pub fn header_map(&self) -> &Headers {
        &self.headers
    }

    /// Flattens the parameters into `(name, value)` query pairs.
    ///
    /// Nested objects use bracket notation (`filter[kind]=x`), arrays repeat
    /// the key with a `[]` suffix (`tag[]=a&tag[]=b`), and `null` members are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParams`] when the top-level parameters are a scalar or
    /// an array.
    pub fn query_pairs(&self) -> Result<Vec<(String, String)>, InvalidParams> {
        let mut pairs = Vec::new();
        match &self.params {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    flatten(key.clone(), value, &mut pairs);
                }
            }
            Some(other) => {
                return Err(InvalidParams {
                    kind: value_kind(other),
                });
            }
        }
        Ok(pairs)
    }
}

fn flatten(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key, b.to_string())),
        Value::Number(n) => out.push((key, n.to_string())),
        Value::String(s) => out.push((key, s.clone())),
        Value::Array(items) => {
            let key = format!("{key}[]");
            for item in items {
                flatten(key.clone(), item, out);
            }
        }
        Value::Object(map) => {
            for (member, nested) in map {
                flatten(format!("{key}[{member}]"), nested, out);
            }
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
