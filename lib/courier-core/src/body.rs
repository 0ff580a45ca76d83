//! Body content types and JSON deserialization.

use serde_json::Value;

use crate::{Error, Result};

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse raw bytes into a JSON value.
///
/// # Errors
///
/// Returns [`Error::ParsingFailed`] if the bytes are not valid JSON.
///
/// # Example
///
/// ```
/// use courier_core::parse_json;
///
/// let value = parse_json(br#"{"ok":true}"#).expect("valid JSON");
/// assert_eq!(value["ok"], true);
/// ```
pub fn parse_json(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| Error::parsing_failed("", e.to_string()))
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the exact path to the
/// field that failed to deserialize.
///
/// # Errors
///
/// Returns [`Error::ParsingFailed`] with the path to the problematic field
/// (e.g. `user.address.city`).
///
/// # Example
///
/// ```
/// use courier_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let user: User = from_json(br#"{"name":"Alice"}"#).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| Error::parsing_failed(e.path().to_string(), e.inner().to_string()))
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn content_type_as_str() {
        check!(ContentType::Json.as_str() == "application/json");
        check!(ContentType::FormUrlEncoded.to_string() == "application/x-www-form-urlencoded");
    }

    #[test]
    fn parse_json_invalid() {
        let result = parse_json(b"not json");
        let_assert!(Err(err) = result);
        check!(err.is_parsing());
    }

    #[test]
    fn from_json_missing_field_error_with_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Address {
            #[allow(dead_code)]
            city: String,
        }

        #[derive(Debug, serde::Deserialize)]
        struct User {
            #[allow(dead_code)]
            address: Address,
        }

        let result = from_json::<User>(br#"{"address":{}}"#);
        let_assert!(Err(Error::ParsingFailed { path, message }) = result);
        check!(path == "address");
        check!(message.contains("city"));
    }
}
