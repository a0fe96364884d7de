//! Cache key derivation.
//!
//! A [`CallDescriptor`] (credential, method, resolved target, parameters) is
//! reduced to a short [`CacheKey`]:
//!
//! ```text
//! <hash(credential)>-<MM><hash(target)>-<hash(params)>
//! ```
//!
//! `MM` is the uppercased two-letter method prefix (`UN` when no method is
//! known). Each hash is a [`structural_hash`]: the value is canonicalized so
//! object member order never matters, rendered as compact JSON and fed to a
//! [`KeyHasher`]. Absent values hash to [`ABSENT`], which no real value can
//! produce.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::http::Method;

pub mod canonical;
pub mod hasher;

pub use canonical::{Canonical, canonicalize};
pub use hasher::{KeyHasher, Murmur2};

/// Hash text used for absent values.
pub const ABSENT: &str = "undefined";

/// Method segment used when the descriptor carries no method.
const UNKNOWN_METHOD: &str = "UN";

/// The identity of one outbound call, as far as caching is concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallDescriptor<'a> {
    /// Opaque client credential; keeps tenants apart.
    pub credential: &'a str,
    pub method: Option<&'a Method>,
    /// Fully resolved target, including scheme and host.
    pub target: &'a str,
    pub params: Option<&'a Value>,
}

impl<'a> CallDescriptor<'a> {
    pub fn new(credential: &'a str, target: &'a str) -> Self {
        Self {
            credential,
            method: None,
            target,
            params: None,
        }
    }

    #[must_use]
    pub fn method(mut self, method: &'a Method) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn params(mut self, params: Option<&'a Value>) -> Self {
        self.params = params;
        self
    }
}

/// A derived cache key. Recomputed per call, never stored as state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How the method appears in the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyLayout {
    /// First two letters of the method, uppercased.
    ///
    /// Matches the original key format.
    /// Methods sharing a two-letter prefix (`PUT`/`PURGE`) share a segment.
    #[default]
    Compatible,
    /// The whole uppercased method name in the same slot.
    FullMethod,
}

/// Derives keys with a chosen hasher and layout.
///
/// # Examples
///
/// ```
/// use apicache::http::Method;
/// use apicache::key::{CallDescriptor, KeyDeriver};
/// use serde_json::json;
///
/// let deriver = KeyDeriver::default();
/// let a = json!({ "a": 1, "b": 2 });
/// let b = json!({ "b": 2, "a": 1 });
/// let d1 = CallDescriptor::new("key", "https://api.example.com/e").method(&Method::Get).params(Some(&a));
/// let d2 = CallDescriptor::new("key", "https://api.example.com/e").method(&Method::Get).params(Some(&b));
/// assert_eq!(deriver.derive(&d1), deriver.derive(&d2));
/// ```
#[derive(Clone)]
pub struct KeyDeriver {
    hasher: Arc<dyn KeyHasher>,
    layout: KeyLayout,
}

impl fmt::Debug for KeyDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDeriver")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(KeyLayout::default())
    }
}

impl KeyDeriver {
    /// Creates a deriver backed by [`Murmur2`].
    pub fn new(layout: KeyLayout) -> Self {
        Self {
            hasher: Arc::new(Murmur2::default()),
            layout,
        }
    }

    /// Swaps the hash function. Canonicalization is unaffected.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn KeyHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn layout(&self) -> KeyLayout {
        self.layout
    }

    /// Hashes a possibly absent value.
    pub fn structural_hash(&self, value: Option<&Value>) -> String {
        match value {
            None => ABSENT.to_owned(),
            Some(value) => {
                let text = canonicalize(value).to_string();
                self.hasher.hash(text.as_bytes())
            }
        }
    }

    fn hash_text(&self, text: &str) -> String {
        self.structural_hash(Some(&Value::from(text)))
    }

    fn method_segment(&self, method: Option<&Method>) -> String {
        let Some(method) = method else {
            return UNKNOWN_METHOD.to_owned();
        };
        let name = method.as_str();
        match self.layout {
            KeyLayout::Compatible => name.chars().take(2).collect::<String>().to_uppercase(),
            KeyLayout::FullMethod => name.to_uppercase(),
        }
    }

    /// Derives the cache key for `descriptor`.
    pub fn derive(&self, descriptor: &CallDescriptor<'_>) -> CacheKey {
        CacheKey(format!(
            "{}-{}{}-{}",
            self.hash_text(descriptor.credential),
            self.method_segment(descriptor.method),
            self.hash_text(descriptor.target),
            self.structural_hash(descriptor.params),
        ))
    }
}

/// Hashes a possibly absent value with the default hasher.
///
/// # Examples
///
/// ```
/// use apicache::key::structural_hash;
/// use serde_json::json;
///
/// assert_eq!(structural_hash(None), "undefined");
/// assert_ne!(structural_hash(Some(&json!({}))), "undefined");
/// ```
pub fn structural_hash(value: Option<&Value>) -> String {
    KeyDeriver::default().structural_hash(value)
}

/// Derives a key with the default hasher and the compatible layout.
pub fn derive_key(descriptor: &CallDescriptor<'_>) -> CacheKey {
    KeyDeriver::default().derive(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TARGET: &str = "https://api.test-domain.com/endpoint";

    #[test]
    fn matches_original_key_format() {
        let params = json!({ "foo": "bar", "baz": "qux" });
        let d = CallDescriptor::new("test-key", "/endpoint")
            .method(&Method::Get)
            .params(Some(&params));
        assert_eq!(derive_key(&d).as_str(), "1329783264-GE461901193-3283570612");
    }

    #[test]
    fn composition_uses_component_hashes() {
        let params = json!({ "foobar": "fizzbazz" });
        let d = CallDescriptor::new("test-key", TARGET)
            .method(&Method::Get)
            .params(Some(&params));
        let expected = format!(
            "{}-GE{}-{}",
            structural_hash(Some(&json!("test-key"))),
            structural_hash(Some(&json!(TARGET))),
            structural_hash(Some(&params)),
        );
        assert_eq!(derive_key(&d).into_string(), expected);
    }

    #[test]
    fn deterministic() {
        let params = json!({ "n": [1, 2, { "x": 1 }] });
        let d = CallDescriptor::new("k", TARGET).params(Some(&params));
        assert_eq!(derive_key(&d), derive_key(&d));
    }

    #[test]
    fn member_order_does_not_matter() {
        let a = json!({ "a": 1, "b": { "c": 1, "d": 2 } });
        let b = json!({ "b": { "d": 2, "c": 1 }, "a": 1 });
        let get = Method::Get;
        let d1 = CallDescriptor::new("k", "/e").method(&get).params(Some(&a));
        let d2 = CallDescriptor::new("k", "/e").method(&get).params(Some(&b));
        assert_eq!(derive_key(&d1), derive_key(&d2));
    }

    #[test]
    fn array_order_matters() {
        let a = json!({ "ids": [1, 2] });
        let b = json!({ "ids": [2, 1] });
        let d1 = CallDescriptor::new("k", "/e").params(Some(&a));
        let d2 = CallDescriptor::new("k", "/e").params(Some(&b));
        assert_ne!(derive_key(&d1), derive_key(&d2));
    }

    #[test]
    fn target_and_credential_partition_keys() {
        let params = json!({ "foo": "bar" });
        let base = CallDescriptor::new("k", "https://api.test-domain.com/endpoint").params(Some(&params));
        let other_host = CallDescriptor::new("k", "https://api.other-domain.com/endpoint").params(Some(&params));
        let other_cred = CallDescriptor::new("k2", "https://api.test-domain.com/endpoint").params(Some(&params));
        assert_ne!(derive_key(&base), derive_key(&other_host));
        assert_ne!(derive_key(&base), derive_key(&other_cred));
    }

    #[test]
    fn changed_value_changes_key() {
        let a = json!({ "q": "one" });
        let b = json!({ "q": "two" });
        let d1 = CallDescriptor::new("k", "/e").params(Some(&a));
        let d2 = CallDescriptor::new("k", "/e").params(Some(&b));
        assert_ne!(derive_key(&d1), derive_key(&d2));
    }

    #[test]
    fn absent_params_differ_from_empty_object() {
        let empty = json!({});
        let absent = CallDescriptor::new("k", "/e");
        let present = CallDescriptor::new("k", "/e").params(Some(&empty));
        assert!(derive_key(&absent).as_str().ends_with("-undefined"));
        assert_ne!(derive_key(&absent), derive_key(&present));
    }

    #[test]
    fn scalar_params_hash_as_text() {
        let number = json!(1);
        let string = json!("1");
        let d1 = CallDescriptor::new("k", "/e").params(Some(&number));
        let d2 = CallDescriptor::new("k", "/e").params(Some(&string));
        assert_ne!(derive_key(&d1), derive_key(&d2));
    }

    #[test]
    fn method_segment() {
        let post = Method::Post;
        let purge: Method = "purge".parse().unwrap();
        let put = Method::Put;
        let none = CallDescriptor::new("k", "/e");
        assert!(derive_key(&none).as_str().contains("-UN"));
        assert!(derive_key(&none.method(&post)).as_str().contains("-PO"));

        // Known weak spot of the compatible layout.
        assert_eq!(derive_key(&none.method(&put)), derive_key(&none.method(&purge)));

        let full = KeyDeriver::new(KeyLayout::FullMethod);
        assert_ne!(full.derive(&none.method(&put)), full.derive(&none.method(&purge)));
        assert!(full.derive(&none.method(&purge)).as_str().contains("-PURGE"));
    }

    #[test]
    fn hasher_is_swappable() {
        struct Constant;
        impl KeyHasher for Constant {
            fn hash(&self, _bytes: &[u8]) -> String {
                "h".to_owned()
            }
        }
        let deriver = KeyDeriver::default().with_hasher(Arc::new(Constant));
        let d = CallDescriptor::new("k", "/e").method(&Method::Get);
        assert_eq!(deriver.derive(&d).as_str(), "h-GEh-undefined");
    }
}
