//! Request parameters.
//!
//! [`Params`] is the single input of every encoding path: query strings,
//! URL-encoded and JSON bodies, and the text parts of multipart bodies.
//!
//! # Example
//!
//! ```
//! use courier_core::Params;
//!
//! let params = Params::new()
//!     .with("q", "rust")
//!     .with("page", 2)
//!     .with("tags", vec!["http", "client"]);
//!
//! assert_eq!(params.len(), 3);
//! ```

use std::fmt;

use serde::ser::{SerializeMap, Serializer};

/// A single parameter value renderable as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text value.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl serde::Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(value) => serializer.serialize_str(value),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::Bool(value) => serializer.serialize_bool(*value),
        }
    }
}

/// A parameter value: a scalar or a sequence of scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Single value.
    Scalar(Scalar),
    /// Sequence of values, encoded with the `key[]` convention.
    List(Vec<Scalar>),
}

impl fmt::Display for ParamValue {
    /// Scalars render as-is; lists render as `["a", "b"]` or `[1, 2]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => scalar.fmt(f),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    match item {
                        Scalar::Text(text) => write!(f, "{text:?}")?,
                        other => other.fmt(f)?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

impl serde::Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::List(items) => serializer.collect_seq(items),
        }
    }
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<Scalar>> for ParamValue {
    fn from(value: Vec<Scalar>) -> Self {
        Self::List(value)
    }
}

macro_rules! impl_scalar_from {
    ($($ty:ty => $variant:ident($conv:expr)),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Self::$variant($conv(value))
                }
            }

            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::from(value))
                }
            }

            impl From<Vec<$ty>> for ParamValue {
                fn from(value: Vec<$ty>) -> Self {
                    Self::List(value.into_iter().map(Scalar::from).collect())
                }
            }
        )*
    };
}

impl_scalar_from! {
    String => Text(std::convert::identity),
    &str => Text(str::to_string),
    i64 => Integer(std::convert::identity),
    i32 => Integer(i64::from),
    i16 => Integer(i64::from),
    u32 => Integer(i64::from),
    u16 => Integer(i64::from),
    u8 => Integer(i64::from),
    f64 => Float(std::convert::identity),
    f32 => Float(f64::from),
    bool => Bool(std::convert::identity),
}

/// Ordered mapping from parameter names to values.
///
/// Inserting an existing key replaces its value in place, so iteration
/// order is the order in which keys were first inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts a value, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`Params::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl serde::Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut params = Params::new().with("a", 1).with("b", 2);
        params.insert("a", "one");

        let keys: Vec<_> = params.iter().map(|(key, _)| key).collect();
        check!(keys == ["a", "b"]);
        check!(params.get("a") == Some(&ParamValue::from("one")));
    }

    #[test]
    fn scalar_display() {
        check!(Scalar::from("x").to_string() == "x");
        check!(Scalar::from(42).to_string() == "42");
        check!(Scalar::from(1.5).to_string() == "1.5");
        check!(Scalar::from(true).to_string() == "true");
    }

    #[test]
    fn list_display() {
        check!(ParamValue::from(vec!["a", "b"]).to_string() == r#"["a", "b"]"#);
        check!(ParamValue::from(vec![1, 2]).to_string() == "[1, 2]");
        check!(ParamValue::List(Vec::new()).to_string() == "[]");
    }

    #[test]
    fn serialize_native_json() {
        let params = Params::new()
            .with("name", "Alice")
            .with("age", 30)
            .with("admin", false)
            .with("ids", vec![1, 2]);

        let json = serde_json::to_value(&params).expect("serialize");
        let expected = serde_json::json!({"name": "Alice", "age": 30, "admin": false, "ids": [1, 2]});
        check!(json == expected);
    }

    #[test]
    fn collect_from_pairs() {
        let params: Params = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        check!(params.len() == 2);
        check!(params.get("a") == Some(&ParamValue::from("3")));
        check!(params.get("missing").is_none());
    }
}
