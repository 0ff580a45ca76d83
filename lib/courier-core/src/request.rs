//! HTTP request building.
//!
//! A [`RequestDescriptor`] describes a call (verb, base URL, route, params,
//! attachments) and produces the final [`Request`] handed to a transport.
//!
//! # Example
//!
//! ```
//! use courier_core::{Method, Params, RequestDescriptor};
//!
//! let request = RequestDescriptor::new(Method::Get, "https://api.example.com", "/users")
//!     .params(Params::new().with("page", 1))
//!     .header("Accept", "application/json")
//!     .build()
//!     .expect("valid request");
//!
//! assert_eq!(request.url().as_str(), "https://api.example.com/users?page=1");
//! assert!(request.body().is_none());
//! ```

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::encoding::{ArrayEncoding, ParameterEncoding, encode_body, to_url_encoded};
use crate::multipart::{self, Attachment};
use crate::{Error, Method, Params, Result};

const CONTENT_TYPE: &str = "Content-Type";

/// An HTTP request ready to be executed by a transport.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
    timeout: Option<Duration>,
    extensions: http::Extensions,
}

/// Owned components of a [`Request`].
#[derive(Debug)]
pub struct RequestParts<B = Bytes> {
    /// HTTP method.
    pub method: Method,
    /// Request URL.
    pub url: url::Url,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<B>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
    /// Typed values attached for middleware and transports.
    pub extensions: http::Extensions,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
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

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Per-request timeout; `None` means the transport default applies.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Typed extensions (e.g. an upload progress reporter).
    #[must_use]
    pub const fn extensions(&self) -> &http::Extensions {
        &self.extensions
    }

    /// Mutable access to extensions.
    #[must_use]
    pub fn extensions_mut(&mut self) -> &mut http::Extensions {
        &mut self.extensions
    }

    /// Consume into its parts.
    #[must_use]
    pub fn into_parts(self) -> RequestParts<B> {
        RequestParts {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            timeout: self.timeout,
            extensions: self.extensions,
        }
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
    timeout: Option<Duration>,
    extensions: http::Extensions,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
            timeout: None,
            extensions: http::Extensions::new(),
        }
    }

    /// Sets a header, replacing any header with the same name regardless of case.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers(self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attaches a typed extension.
    #[must_use]
    pub fn extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            timeout: self.timeout,
            extensions: self.extensions,
        }
    }
}

/// Description of a single call, turned into a [`Request`] by [`build`](Self::build).
///
/// A descriptor is consumed when built, so it is never reused across calls.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    base_url: String,
    route: String,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    encoding: ParameterEncoding,
    arrays: ArrayEncoding,
    params: Params,
    attachments: Option<Vec<Attachment>>,
    boundary: Option<String>,
}

impl RequestDescriptor {
    /// Creates a descriptor for `base_url + route`.
    #[must_use]
    pub fn new(method: Method, base_url: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            route: route.into(),
            headers: Vec::new(),
            timeout: None,
            encoding: ParameterEncoding::default(),
            arrays: ArrayEncoding::default(),
            params: Params::new(),
            attachments: None,
            boundary: None,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Parameters carried by the call.
    #[must_use]
    pub const fn parameters(&self) -> &Params {
        &self.params
    }

    /// Adds a caller header, applied after the computed `Content-Type`.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds multiple caller headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the body encoding.
    #[must_use]
    pub const fn encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets how list parameters are URL-encoded.
    #[must_use]
    pub const fn array_encoding(mut self, arrays: ArrayEncoding) -> Self {
        self.arrays = arrays;
        self
    }

    /// Replaces all parameters.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Adds a single parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<crate::ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Attaches files, switching the body to `multipart/form-data`.
    #[must_use]
    pub fn attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments
            .get_or_insert_with(Vec::new)
            .extend(attachments);
        self
    }

    /// Uses a fixed multipart boundary instead of a random one.
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Builds the final request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRequest`] if `base_url + route` is not a
    /// valid absolute URL, or if the JSON body cannot be encoded.
    pub fn build(self) -> Result<Request> {
        let raw_url = format!("{}{}", self.base_url, self.route);
        let mut url = url::Url::parse(&raw_url)
            .map_err(|e| Error::malformed_request(format!("invalid URL '{raw_url}': {e}")))?;

        if self.method.is_no_body() && !self.params.is_empty() {
            let encoded = to_url_encoded(&self.params, self.arrays);
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
                _ => encoded,
            };
            url.set_query(Some(&query));
        }

        let (content_type, body) = match &self.attachments {
            Some(attachments) => {
                let boundary = self.boundary.unwrap_or_else(multipart::generate_boundary);
                (
                    Some(multipart::content_type(&boundary)),
                    Some(multipart::build(&self.params, attachments, &boundary)),
                )
            }
            None if self.method.is_no_body() => (None, None),
            None => (
                Some(self.encoding.content_type().as_str().to_string()),
                Some(encode_body(&self.params, self.encoding, self.arrays)?),
            ),
        };

        let mut builder = Request::builder(self.method, url);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder = builder.headers(self.headers).timeout(self.timeout);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let request = builder.build();
        debug!(
            method = %request.method(),
            url = %request.url(),
            body_len = request.body().map_or(0, Bytes::len),
            "built request"
        );
        Ok(request)
    }
}
