//! Parameter encoding.
//!
//! Turns [`Params`] into a query string, a URL-encoded body, or a JSON body.
//!
//! # Example
//!
//! ```
//! use courier_core::{ArrayEncoding, Params, to_url_encoded};
//!
//! let params = Params::new().with("q", "a&b=c");
//! assert_eq!(to_url_encoded(&params, ArrayEncoding::default()), "q=a%26b%3Dc");
//! ```

use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{ContentType, Error, ParamValue, Params, Result};

/// Characters left unescaped in query keys and values.
///
/// Everything outside ASCII alphanumerics and `-._~/?` is escaped, which
/// covers the general delimiters `:#[]@` and the sub-delimiters
/// `!$&'()*+,;=` so that `=` and `&` inside a value never split it.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b'?');

/// Body encoding used for body-carrying verbs without attachments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParameterEncoding {
    /// `application/x-www-form-urlencoded`
    #[default]
    UrlEncoded,
    /// `application/json`
    Json,
}

impl ParameterEncoding {
    /// Content type announced for bodies in this encoding.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::UrlEncoded => ContentType::FormUrlEncoded,
            Self::Json => ContentType::Json,
        }
    }
}

/// How list parameters are rendered in URL-encoded form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ArrayEncoding {
    /// `key[]=a&key[]=b` followed by `key=["a", "b"]`.
    ///
    /// Servers written against the legacy client expect both forms.
    #[default]
    BracketsWithPlain,
    /// `key[]=a&key[]=b` only.
    Brackets,
}

/// Percent-encode a key or value for use in a query string or form body.
#[must_use]
pub fn escape(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Encode parameters as `key=value` pairs joined by `&`.
///
/// Used both for the query string of `GET` requests and for
/// `application/x-www-form-urlencoded` bodies.
#[must_use]
pub fn to_url_encoded(params: &Params, arrays: ArrayEncoding) -> String {
    let mut pairs = Vec::with_capacity(params.len());

    for (key, value) in params.iter() {
        let key = escape(key);
        match value {
            ParamValue::Scalar(scalar) => {
                pairs.push(format!("{key}={}", escape(&scalar.to_string())));
            }
            ParamValue::List(items) => {
                pairs.extend(
                    items
                        .iter()
                        .map(|item| format!("{key}[]={}", escape(&item.to_string()))),
                );
                if arrays == ArrayEncoding::BracketsWithPlain {
                    pairs.push(format!("{key}={}", escape(&value.to_string())));
                }
            }
        }
    }

    pairs.join("&")
}

/// Serialize parameters as a JSON object.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_json_body(params: &Params) -> Result<Bytes> {
    serde_json::to_vec(params)
        .map(Bytes::from)
        .map_err(|e| Error::malformed_request(format!("cannot encode JSON body: {e}")))
}

/// Encode parameters as a request body.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn encode_body(
    params: &Params,
    encoding: ParameterEncoding,
    arrays: ArrayEncoding,
) -> Result<Bytes> {
    match encoding {
        ParameterEncoding::UrlEncoded => Ok(Bytes::from(to_url_encoded(params, arrays))),
        ParameterEncoding::Json => to_json_body(params),
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn escape_reserved_characters() {
        check!(escape("a b") == "a%20b");
        check!(escape(":#[]@") == "%3A%23%5B%5D%40");
        check!(escape("!$&'()*+,;=") == "%21%24%26%27%28%29%2A%2B%2C%3B%3D");
        check!(escape("path/to?x") == "path/to?x");
        check!(escape("-._~") == "-._~");
        check!(escape("é") == "%C3%A9");
        check!(escape("100%") == "100%25");
    }

    #[test]
    fn scalars_encode_in_order() {
        let params = Params::new()
            .with("name", "Jane Doe")
            .with("age", 42)
            .with("admin", true);

        check!(
            to_url_encoded(&params, ArrayEncoding::default())
                == "name=Jane%20Doe&age=42&admin=true"
        );
    }

    #[test]
    fn list_with_trailing_plain_entry() {
        let params = Params::new().with("ids", vec![1, 2]);

        check!(
            to_url_encoded(&params, ArrayEncoding::BracketsWithPlain)
                == "ids[]=1&ids[]=2&ids=%5B1%2C%202%5D"
        );
    }

    #[test]
    fn list_brackets_only() {
        let params = Params::new().with("tags", vec!["a&b", "c"]);

        check!(to_url_encoded(&params, ArrayEncoding::Brackets) == "tags[]=a%26b&tags[]=c");
    }

    #[test]
    fn scalars_round_trip_through_form_parser() {
        let params = Params::new()
            .with("q", "rust & http = fun")
            .with("symbols", "!$'()*+,;:@#[]")
            .with("unicode", "日本語")
            .with("n", -7)
            .with("empty", "");

        let encoded = to_url_encoded(&params, ArrayEncoding::default());
        let decoded: Vec<(String, String)> =
            serde_urlencoded::from_str(&encoded).expect("parse query");

        let expected: Vec<(String, String)> = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        check!(decoded == expected);
    }

    const AWKWARD: &[&str] = &[
        "",
        "plain",
        "two words",
        "a+b",
        "100%",
        "%41",
        "k=v",
        "a&b",
        "x[]=1",
        "path/to?query",
        "-._~",
        "line\nbreak",
        "tab\tstop",
        "\u{1}\u{7f}",
        "naïve café",
        "日本語",
        "🦀🎉",
        "!$'()*,;:@#",
    ];

    fn decode(encoded: &str) -> Vec<(String, String)> {
        serde_urlencoded::from_str(encoded).expect("parse form")
    }

    #[test]
    fn awkward_pairs_round_trip_through_form_parser() {
        for key in AWKWARD {
            for value in AWKWARD {
                let params = Params::new().with(*key, *value);
                let encoded = to_url_encoded(&params, ArrayEncoding::default());
                check!(
                    decode(&encoded) == vec![(key.to_string(), value.to_string())],
                    "{key:?}={value:?} encoded as {encoded:?}"
                );
            }
        }
    }

    #[test]
    fn awkward_params_round_trip_together() {
        let params = AWKWARD
            .iter()
            .zip(AWKWARD.iter().rev())
            .fold(Params::new(), |params, (key, value)| params.with(*key, *value));

        let encoded = to_url_encoded(&params, ArrayEncoding::default());
        let expected: Vec<(String, String)> = AWKWARD
            .iter()
            .zip(AWKWARD.iter().rev())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        check!(decode(&encoded) == expected);
    }

    #[test]
    fn awkward_lists_round_trip_with_plain_entry() {
        for key in AWKWARD {
            let items: Vec<&str> = AWKWARD.to_vec();
            let params = Params::new().with(*key, items.clone());
            let plain = params.get(key).expect("list").to_string();

            let encoded = to_url_encoded(&params, ArrayEncoding::BracketsWithPlain);
            let mut expected: Vec<(String, String)> = items
                .iter()
                .map(|item| (format!("{key}[]"), item.to_string()))
                .collect();
            expected.push((key.to_string(), plain));
            check!(decode(&encoded) == expected, "key {key:?}");
        }
    }

    #[test]
    fn json_body_uses_native_types() {
        let params = Params::new().with("name", "Bob").with("ids", vec![1, 2]);

        let body = to_json_body(&params).expect("json");
        check!(body.as_ref() == br#"{"name":"Bob","ids":[1,2]}"#);
    }

    #[test]
    fn encode_body_by_mode() {
        let params = Params::new().with("a", "1");

        let form = encode_body(&params, ParameterEncoding::UrlEncoded, ArrayEncoding::default())
            .expect("form");
        check!(form.as_ref() == b"a=1");

        let json =
            encode_body(&params, ParameterEncoding::Json, ArrayEncoding::default()).expect("json");
        check!(json.as_ref() == br#"{"a":"1"}"#);
    }

    #[test]
    fn encoding_content_types() {
        check!(
            ParameterEncoding::UrlEncoded.content_type().as_str()
                == "application/x-www-form-urlencoded"
        );
        check!(ParameterEncoding::Json.content_type().as_str() == "application/json");
    }
}
