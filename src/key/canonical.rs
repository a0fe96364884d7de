//! Canonical form of dynamically shaped parameter trees.
//!
//! Object members are sorted by key at every depth; array elements keep
//! their order. Two values that differ only in object member order therefore
//! render to identical text, while reordered arrays do not.

use std::fmt;

use serde_json::Value;

/// A JSON value with every object's members sorted by key.
#[derive(Debug, Clone, PartialEq)]
pub enum Canonical<'a> {
    /// `null`, booleans, numbers and strings.
    Scalar(&'a Value),
    /// An array, in its original order.
    Sequence(Vec<Canonical<'a>>),
    /// An object, members sorted lexicographically by key.
    Map(Vec<(&'a str, Canonical<'a>)>),
}

/// Builds the canonical form of `value`.
///
/// # Examples
///
/// ```
/// use apicache::key::canonical::canonicalize;
/// use serde_json::json;
///
/// let a = json!({ "b": 2, "a": { "y": [3, 1], "x": null } });
/// assert_eq!(canonicalize(&a).to_string(), r#"{"a":{"x":null,"y":[3,1]},"b":2}"#);
/// ```
pub fn canonicalize(value: &Value) -> Canonical<'_> {
    match value {
        Value::Array(items) => Canonical::Sequence(items.iter().map(canonicalize).collect()),
        Value::Object(map) => {
            let mut members: Vec<_> = map
                .iter()
                .map(|(key, nested)| (key.as_str(), canonicalize(nested)))
                .collect();
            members.sort_by(|(a, _), (b, _)| a.cmp(b));
            Canonical::Map(members)
        }
        scalar => Canonical::Scalar(scalar),
    }
}

/// Compact JSON text, no insignificant whitespace.
impl fmt::Display for Canonical<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Value's Display is compact JSON with standard string escaping.
            Self::Scalar(value) => write!(f, "{value}"),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(members) => {
                f.write_str("{")?;
                for (i, (key, nested)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{nested}", Value::from(*key))?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_member_order_is_normalized() {
        let a = json!({ "outer": { "b": 1, "a": 2 }, "z": true });
        let b = json!({ "z": true, "outer": { "a": 2, "b": 1 } });
        assert_eq!(canonicalize(&a).to_string(), canonicalize(&b).to_string());
    }

    #[test]
    fn array_order_is_preserved() {
        let a = json!({ "ids": [1, 2] });
        let b = json!({ "ids": [2, 1] });
        assert_ne!(canonicalize(&a).to_string(), canonicalize(&b).to_string());
    }

    #[test]
    fn objects_inside_arrays_are_sorted() {
        let v = json!([{ "b": 1, "a": 2 }]);
        assert_eq!(canonicalize(&v).to_string(), r#"[{"a":2,"b":1}]"#);
    }

    #[test]
    fn scalars_render_as_json() {
        assert_eq!(canonicalize(&json!("he said \"hi\"")).to_string(), r#""he said \"hi\"""#);
        assert_eq!(canonicalize(&json!(null)).to_string(), "null");
        assert_eq!(canonicalize(&json!(42)).to_string(), "42");
        assert_eq!(canonicalize(&json!({})).to_string(), "{}");
    }
}
