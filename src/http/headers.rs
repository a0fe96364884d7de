//! Outbound header map with case-insensitive name lookup.
//!
//! Header names are case-insensitive per RFC 9110 §5; insertion order is
//! kept when the map is copied onto an outgoing request.

/// A case-insensitive, multi-value HTTP header map.
///
/// # Examples
///
/// ```
/// use apicache::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.insert("Accept", "application/json");
/// headers.set("X-RapidAPI-Key", "first");
/// headers.set("x-rapidapi-key", "second");
///
/// assert_eq!(headers.get("accept"), Some("application/json"));
/// assert_eq!(headers.get("X-RapidAPI-Key"), Some("second"));
/// assert_eq!(headers.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header map with pre-allocated capacity for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
        }
    }

    /// Appends a header entry. Multiple values for the same name are preserved.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Replaces every entry named `name` with a single `name: value` entry.
    ///
    /// The replacement keeps the position of the first existing entry, or is
    /// appended when the name was absent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .inner
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(pos) => {
                self.inner[pos] = (name.clone(), value);
                let mut index = 0;
                self.inner.retain(|(k, _)| {
                    let keep = index <= pos || !k.eq_ignore_ascii_case(&name);
                    index += 1;
                    keep
                });
            }
            None => self.inner.push((name, value)),
        }
    }

    /// Returns the first value for the given header name (case-insensitive), or `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the map contains at least one entry with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Returns the total number of header entries (not unique names).
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no header entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over all `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_get() {
        let mut h = Headers::new();
        h.insert("X-RapidAPI-Host", "api.example.com");
        assert_eq!(h.get("x-rapidapi-host"), Some("api.example.com"));
        assert_eq!(h.get("X-RAPIDAPI-HOST"), Some("api.example.com"));
    }

    #[test]
    fn set_collapses_duplicates_in_place() {
        let mut h = Headers::new();
        h.insert("Accept", "a");
        h.insert("X-Trace", "1");
        h.insert("accept", "b");
        h.set("ACCEPT", "c");
        let all: Vec<_> = h.iter().collect();
        assert_eq!(all, vec![("ACCEPT", "c"), ("X-Trace", "1")]);
    }

    #[test]
    fn collect_uses_set_semantics() {
        let h: Headers = [("Content-Type", "text/plain"), ("content-type", "application/json")]
            .into_iter()
            .collect();
        assert_eq!(h.len(), 1);
        assert_eq!(h.get("Content-Type"), Some("application/json"));
    }
}
