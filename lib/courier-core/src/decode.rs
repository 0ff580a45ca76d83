//! Model decoding.
//!
//! A [`ModelDecoder`] turns a JSON value into a typed model. [`SerdeDecoder`]
//! decodes any `serde` model; closures work as one-off decoders. [`Parser`]
//! combines keypath extraction with a decoder.
//!
//! # Example
//!
//! ```
//! use courier_core::Parser;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! struct User { id: u64 }
//!
//! let json = json!({"result": {"users": [{"id": 1}, {"id": 2}]}});
//! let users: Vec<User> = Parser::new()
//!     .to_models(&json, Some("result.users"))
//!     .expect("decodes");
//! assert_eq!(users.len(), 2);
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result, extract, extract_array};

/// Decodes a JSON value into `T`.
pub trait ModelDecoder<T> {
    /// Decode `json` into a model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParsingFailed`] if the JSON does not describe a `T`.
    fn decode(&self, json: &Value) -> Result<T>;
}

impl<T, F> ModelDecoder<T> for F
where
    F: Fn(&Value) -> Result<T>,
{
    fn decode(&self, json: &Value) -> Result<T> {
        self(json)
    }
}

/// Decoder for every `serde`-deserializable model.
///
/// Errors carry the JSON path of the offending field.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeDecoder;

impl<T: DeserializeOwned> ModelDecoder<T> for SerdeDecoder {
    fn decode(&self, json: &Value) -> Result<T> {
        serde_path_to_error::deserialize(json)
            .map_err(|e| Error::parsing_failed(e.path().to_string(), e.inner().to_string()))
    }
}

/// Keypath-aware decoding of models and collections.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    default_collection_keypath: Option<String>,
}

impl Parser {
    /// Creates a parser without a default collection keypath.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_collection_keypath: None,
        }
    }

    /// Sets the keypath used by [`to_models`](Self::to_models) when none is given.
    #[must_use]
    pub fn with_default_collection_keypath(mut self, keypath: Option<String>) -> Self {
        self.default_collection_keypath = keypath;
        self
    }

    /// The default collection keypath.
    #[must_use]
    pub fn default_collection_keypath(&self) -> Option<&str> {
        self.default_collection_keypath.as_deref()
    }

    /// Decode a single model at `keypath` (the root when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParsingFailed`] if the keypath does not resolve or
    /// the value does not decode.
    pub fn to_model<T: DeserializeOwned>(&self, json: &Value, keypath: Option<&str>) -> Result<T> {
        self.to_model_with(&SerdeDecoder, json, keypath)
    }

    /// [`to_model`](Self::to_model) with a custom decoder.
    ///
    /// # Errors
    ///
    /// See [`to_model`](Self::to_model).
    pub fn to_model_with<T, D>(&self, decoder: &D, json: &Value, keypath: Option<&str>) -> Result<T>
    where
        D: ModelDecoder<T> + ?Sized,
    {
        decoder.decode(extract(json, keypath)?)
    }

    /// Decode a collection at `keypath`, falling back to the default
    /// collection keypath.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParsingFailed`] if the keypath does not resolve to an
    /// array of objects or any element does not decode.
    pub fn to_models<T: DeserializeOwned>(
        &self,
        json: &Value,
        keypath: Option<&str>,
    ) -> Result<Vec<T>> {
        self.to_models_with(&SerdeDecoder, json, keypath)
    }

    /// [`to_models`](Self::to_models) with a custom decoder.
    ///
    /// # Errors
    ///
    /// See [`to_models`](Self::to_models).
    pub fn to_models_with<T, D>(
        &self,
        decoder: &D,
        json: &Value,
        keypath: Option<&str>,
    ) -> Result<Vec<T>>
    where
        D: ModelDecoder<T> + ?Sized,
    {
        let keypath = keypath.or(self.default_collection_keypath());
        extract_array(json, keypath)?
            .iter()
            .map(|item| decoder.decode(item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct User {
        id: u64,
        name: String,
    }

    #[test]
    fn model_at_root() {
        let json = json!({"id": 1, "name": "Alice"});
        let_assert!(Ok(user) = Parser::new().to_model::<User>(&json, None));
        check!(user == User { id: 1, name: "Alice".to_string() });
    }

    #[test]
    fn model_at_keypath() {
        let json = json!({"data": {"user": {"id": 2, "name": "Bob"}}});
        let_assert!(Ok(user) = Parser::new().to_model::<User>(&json, Some("data.user")));
        check!(user.id == 2);
    }

    #[test]
    fn model_field_error_has_path() {
        let json = json!({"id": "one", "name": "Alice"});
        let_assert!(Err(Error::ParsingFailed { path, .. }) = Parser::new().to_model::<User>(&json, None));
        check!(path == "id");
    }

    #[test]
    fn models_use_default_keypath() {
        let json = json!({"objects": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]});
        let parser = Parser::new().with_default_collection_keypath(Some("objects".to_string()));

        let_assert!(Ok(users) = parser.to_models::<User>(&json, None));
        check!(users.len() == 2);

        let_assert!(Err(err) = Parser::new().to_models::<User>(&json, None));
        check!(err.is_parsing());
    }

    #[test]
    fn models_explicit_keypath_wins() {
        let json = json!({"objects": [], "result": {"users": [{"id": 3, "name": "C"}]}});
        let parser = Parser::new().with_default_collection_keypath(Some("objects".to_string()));

        let_assert!(Ok(users) = parser.to_models::<User>(&json, Some("result.users")));
        check!(users == vec![User { id: 3, name: "C".to_string() }]);
    }

    #[test]
    fn models_fail_on_missing_keypath() {
        let_assert!(Err(err) = Parser::new().to_models::<User>(&json!({}), Some("data.items")));
        check!(err.is_parsing());
    }

    #[test]
    fn closure_decoder() {
        let decoder = |json: &Value| -> Result<u64> {
            json.get("id")
                .and_then(Value::as_u64)
                .ok_or_else(|| Error::parsing_failed("id", "expected an unsigned integer"))
        };
        let json = json!({"items": [{"id": 5}, {"id": 6}]});

        let_assert!(Ok(ids) = Parser::new().to_models_with(&decoder, &json, Some("items")));
        check!(ids == vec![5, 6]);
    }
}
