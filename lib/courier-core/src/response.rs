//! HTTP response handling and validation.
//!
//! [`validate`] is the single gate between a transport and any decoding: a
//! non-2xx status becomes [`Error::HttpStatus`] before the body is ever
//! treated as data.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use courier_core::validate;
//!
//! let err = validate(404, Bytes::from_static(br#"{"msg":"no"}"#)).expect_err("not found");
//! assert_eq!(err.status(), Some(404));
//! assert_eq!(err.payload(), Some(&serde_json::json!({"msg": "no"})));
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::{Error, Result};

/// Returns `true` for statuses in `200..=299`.
#[must_use]
pub const fn is_success(status: u16) -> bool {
    status >= 200 && status <= 299
}

/// Check a status code, returning the body on success.
///
/// # Errors
///
/// Returns [`Error::HttpStatus`] for any status outside `200..=299`. The
/// payload holds the body decoded as JSON, or `None` if it is not JSON.
pub fn validate(status: u16, body: Bytes) -> Result<Bytes> {
    if is_success(status) {
        return Ok(body);
    }
    let payload = serde_json::from_slice(&body).ok();
    Err(Error::http_status(status, payload))
}

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        is_success(self.status)
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }
}

impl Response<Bytes> {
    /// Validate the status and return the body.
    ///
    /// # Errors
    ///
    /// See [`validate`].
    pub fn validate(self) -> Result<Bytes> {
        validate(self.status, self.body)
    }
}
