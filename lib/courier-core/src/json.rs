//! JSON navigation.
//!
//! - [`JsonValue`] - tri-state container with non-failing accessors
//! - [`extract`] / [`extract_array`] - keypath resolution (`"data.items"`)
//! - [`ResourceBundle`] - loads `.json` resources from a directory

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::{Error, Result, parse_json};

/// A JSON object.
pub type JsonObject = Map<String, Value>;

/// A decoded JSON document: nothing, an object, or an array of objects.
///
/// The accessors never fail: asking an `Empty` value for its object yields
/// an empty map, so traversal needs no prior checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsonValue {
    /// No usable value.
    #[default]
    Empty,
    /// A JSON object.
    Object(JsonObject),
    /// An array whose elements are all objects.
    Array(Vec<JsonObject>),
}

impl JsonValue {
    /// Parse bytes into a [`JsonValue`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParsingFailed`] if the bytes are not valid JSON.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        parse_json(bytes).map(Self::from)
    }

    /// The object, or an empty map for other variants.
    #[must_use]
    pub fn object(&self) -> Cow<'_, JsonObject> {
        match self {
            Self::Object(object) => Cow::Borrowed(object),
            _ => Cow::Owned(JsonObject::new()),
        }
    }

    /// The array, or an empty slice for other variants.
    #[must_use]
    pub fn array(&self) -> &[JsonObject] {
        match self {
            Self::Array(array) => array,
            _ => &[],
        }
    }

    /// Returns `true` for [`JsonValue::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Value> for JsonValue {
    /// Objects and arrays of objects are kept; anything else is `Empty`.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(object) => Self::Object(object),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(object) => Some(object),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map_or(Self::Empty, Self::Array),
            _ => Self::Empty,
        }
    }
}

impl From<JsonObject> for JsonValue {
    fn from(object: JsonObject) -> Self {
        Self::Object(object)
    }
}

impl From<Vec<JsonObject>> for JsonValue {
    fn from(array: Vec<JsonObject>) -> Self {
        Self::Array(array)
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Empty => Self::Null,
            JsonValue::Object(object) => Self::Object(object),
            JsonValue::Array(array) => Self::Array(array.into_iter().map(Self::Object).collect()),
        }
    }
}

/// Resolve a dot-separated keypath inside `json`.
///
/// `None` returns the root unchanged.
///
/// # Errors
///
/// Returns [`Error::ParsingFailed`] if a segment is missing or an
/// intermediate value is not an object.
///
/// # Example
///
/// ```
/// use courier_core::extract;
/// use serde_json::json;
///
/// let json = json!({"data": {"items": [{"id": 1}]}});
/// let items = extract(&json, Some("data.items")).expect("resolves");
/// assert_eq!(items, &json!([{"id": 1}]));
/// ```
pub fn extract<'a>(json: &'a Value, keypath: Option<&str>) -> Result<&'a Value> {
    let Some(keypath) = keypath else {
        return Ok(json);
    };

    keypath.split('.').try_fold(json, |current, segment| {
        let object = current.as_object().ok_or_else(|| {
            Error::parsing_failed(
                keypath,
                format!("expected an object before `{segment}`, found {}", kind(current)),
            )
        })?;
        object
            .get(segment)
            .ok_or_else(|| Error::parsing_failed(keypath, format!("missing key `{segment}`")))
    })
}

/// Resolve a keypath that must point to an array of objects.
///
/// # Errors
///
/// Returns [`Error::ParsingFailed`] if resolution fails, if the value is
/// not an array, or if any element is not an object.
pub fn extract_array<'a>(json: &'a Value, keypath: Option<&str>) -> Result<&'a [Value]> {
    let path = keypath.unwrap_or_default();
    let value = extract(json, keypath)?;
    let items = value.as_array().ok_or_else(|| {
        Error::parsing_failed(path, format!("expected an array, found {}", kind(value)))
    })?;

    if let Some(index) = items.iter().position(|item| !item.is_object()) {
        return Err(Error::parsing_failed(
            format!("{path}[{index}]"),
            "expected an object",
        ));
    }
    Ok(items)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A directory of `.json` resources.
#[derive(Debug, Clone)]
pub struct ResourceBundle {
    root: PathBuf,
}

impl ResourceBundle {
    /// Creates a bundle rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Bundle root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load and parse a resource such as `"users.json"`.
    ///
    /// A name without an extension is looked up with `.json` appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] if the file does not exist and
    /// [`Error::ParsingFailed`] if it cannot be read or is not valid JSON.
    pub fn load(&self, name: &str) -> Result<Value> {
        let mut path = self.root.join(name);
        if path.extension().is_none() {
            path.set_extension("json");
        }
        if !path.is_file() {
            return Err(Error::resource_not_found(name));
        }

        let data = std::fs::read(&path)
            .map_err(|e| Error::parsing_failed("", format!("cannot read {}: {e}", path.display())))?;
        parse_json(&data)
    }
}
