//! High-level client facade.
//!
//! [`Client`] pairs a [`ClientConfig`] with any [`HttpClient`] and turns
//! routes and parameters into raw bytes, JSON, typed models, or an upload
//! stream. Every call validates the status before anything is decoded.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use courier_core::{
    Attachment, Error, HttpClient, Method, Params, Parser, RequestDescriptor, Result,
    TransportFailure, UploadEvent, UploadStream, from_json, parse_json, progress_channel,
};
use futures_core::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::{ClientConfig, HyperClient};

/// API client bound to a base URL.
///
/// Cloning is cheap: clones share the transport and configuration.
///
/// # Example
///
/// ```no_run
/// use courier::{Client, ClientConfig, Params};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn run() -> courier::Result<()> {
/// let client = Client::new(
///     ClientConfig::builder()
///         .base_url("https://api.example.com")
///         .build(),
/// );
///
/// let users: Vec<User> = client
///     .get_models("/users", Params::new().with("page", 1), Some("data.items"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client<C = HyperClient> {
    transport: Arc<C>,
    config: Arc<ClientConfig>,
    parser: Parser,
}

impl<C> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            parser: self.parser.clone(),
        }
    }
}

impl Client<HyperClient> {
    /// Create a client backed by a [`HyperClient`] built from `config`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let transport = HyperClient::with_config(config.clone());
        Self::with_transport(config, transport)
    }
}

impl<C> Client<C> {
    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: C) -> Self {
        let parser =
            Parser::new().with_default_collection_keypath(config.default_collection_keypath.clone());
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
            parser,
        }
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &C {
        &self.transport
    }

    /// The model parser used by decoding calls.
    #[must_use]
    pub const fn parser(&self) -> &Parser {
        &self.parser
    }

    /// A descriptor prefilled with the configured base URL, default
    /// headers, encodings and timeout.
    #[must_use]
    pub fn request(&self, method: Method, route: &str, params: Params) -> RequestDescriptor {
        RequestDescriptor::new(method, self.config.base_url.as_str(), route)
            .headers(self.config.headers.iter().cloned())
            .encoding(self.config.parameter_encoding)
            .array_encoding(self.config.array_encoding)
            .timeout(Some(self.config.timeout))
            .params(params)
    }
}

impl<C: HttpClient> Client<C> {
    // ========================================================================
    // Generic calls
    // ========================================================================

    /// Build, execute and validate a descriptor, returning the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRequest`] if the request cannot be built,
    /// [`Error::Transport`] if no response arrives, and
    /// [`Error::HttpStatus`] for a non-2xx status.
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<Bytes> {
        let request = descriptor.build()?;
        let response = self.transport.execute(request).await?;
        response.validate()
    }

    /// Raw response body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn data(&self, method: Method, route: &str, params: Params) -> Result<Bytes> {
        self.send(self.request(method, route, params)).await
    }

    /// Response body parsed as JSON.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus [`Error::ParsingFailed`] for invalid JSON.
    pub async fn json(&self, method: Method, route: &str, params: Params) -> Result<Value> {
        let data = self.data(method, route, params).await?;
        parse_json(&data)
    }

    /// Discard the response body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn void(&self, method: Method, route: &str, params: Params) -> Result<()> {
        self.data(method, route, params).await.map(drop)
    }

    /// Decode a model found at `keypath`, or at the root.
    ///
    /// Without a keypath the body is deserialized directly, so errors name
    /// the failing field path.
    ///
    /// # Errors
    ///
    /// As [`json`](Self::json), plus [`Error::ParsingFailed`] if the keypath
    /// is missing or the model does not decode.
    pub async fn model<T: DeserializeOwned>(
        &self,
        method: Method,
        route: &str,
        params: Params,
        keypath: Option<&str>,
    ) -> Result<T> {
        let decoded = match keypath {
            None => from_json(&self.data(method, route, params).await?),
            Some(_) => {
                let json = self.json(method, route, params).await?;
                self.parser.to_model(&json, keypath)
            }
        };
        decoded.inspect_err(|err| {
            debug!(route, error = %err, "model decoding failed");
        })
    }

    /// Decode a collection found at `keypath`, falling back to the
    /// configured default collection keypath.
    ///
    /// # Errors
    ///
    /// As [`model`](Self::model).
    pub async fn models<T: DeserializeOwned>(
        &self,
        method: Method,
        route: &str,
        params: Params,
        keypath: Option<&str>,
    ) -> Result<Vec<T>> {
        let json = self.json(method, route, params).await?;
        self.parser.to_models(&json, keypath).inspect_err(|err| {
            debug!(route, error = %err, "collection decoding failed");
        })
    }

    // ========================================================================
    // Verb shorthands
    // ========================================================================

    /// `GET` returning the raw body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn get(&self, route: &str, params: Params) -> Result<Bytes> {
        self.data(Method::Get, route, params).await
    }

    /// `POST` returning the raw body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn post(&self, route: &str, params: Params) -> Result<Bytes> {
        self.data(Method::Post, route, params).await
    }

    /// `PUT` returning the raw body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn put(&self, route: &str, params: Params) -> Result<Bytes> {
        self.data(Method::Put, route, params).await
    }

    /// `PATCH` returning the raw body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn patch(&self, route: &str, params: Params) -> Result<Bytes> {
        self.data(Method::Patch, route, params).await
    }

    /// `DELETE` returning the raw body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn delete(&self, route: &str, params: Params) -> Result<Bytes> {
        self.data(Method::Delete, route, params).await
    }

    /// `GET` returning JSON.
    ///
    /// # Errors
    ///
    /// See [`json`](Self::json).
    pub async fn get_json(&self, route: &str, params: Params) -> Result<Value> {
        self.json(Method::Get, route, params).await
    }

    /// `GET` decoding a model.
    ///
    /// # Errors
    ///
    /// See [`model`](Self::model).
    pub async fn get_model<T: DeserializeOwned>(
        &self,
        route: &str,
        params: Params,
        keypath: Option<&str>,
    ) -> Result<T> {
        self.model(Method::Get, route, params, keypath).await
    }

    /// `GET` decoding a collection.
    ///
    /// # Errors
    ///
    /// See [`models`](Self::models).
    pub async fn get_models<T: DeserializeOwned>(
        &self,
        route: &str,
        params: Params,
        keypath: Option<&str>,
    ) -> Result<Vec<T>> {
        self.models(Method::Get, route, params, keypath).await
    }
}

impl<C: HttpClient + 'static> Client<C> {
    // ========================================================================
    // Upload
    // ========================================================================

    /// Send `attachments` as `multipart/form-data` and observe the upload.
    ///
    /// The call runs on a spawned tokio task. The returned [`Upload`]
    /// yields progress events followed by exactly one terminal item: the
    /// validated response body or an error. Must be called from within a
    /// tokio runtime.
    #[must_use]
    pub fn upload(
        &self,
        method: Method,
        route: &str,
        params: Params,
        attachments: Vec<Attachment>,
    ) -> Upload {
        let (reporter, stream) = progress_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let request = self
            .request(method, route, params)
            .attachments(attachments)
            .build()
            .map(|mut request| {
                request.extensions_mut().insert(reporter.clone());
                request
            });
        let transport = Arc::clone(&self.transport);

        info!(%method, route, "starting upload");
        tokio::spawn(async move {
            let call = async {
                let response = transport.execute(request?).await?;
                response.validate()
            };
            let result = tokio::select! {
                result = call => result,
                Ok(()) = cancel_rx => Err(Error::from(TransportFailure::Cancelled)),
            };
            reporter.finish(result);
        });

        Upload {
            stream,
            cancel: CancelHandle {
                tx: Some(cancel_tx),
            },
        }
    }
}

/// Cancels an in-flight [`Upload`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: Option<oneshot::Sender<()>>,
}

impl CancelHandle {
    /// Abort the transport call; the stream ends with
    /// [`TransportFailure::Cancelled`] unless it already finished.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.tx.take() {
            // The task is gone if the upload already finished
            let _ = tx.send(());
        }
    }
}

/// An upload in progress: a stream of [`UploadEvent`]s plus cancellation.
#[derive(Debug)]
pub struct Upload {
    stream: UploadStream,
    cancel: CancelHandle,
}

impl Upload {
    /// Cancel the upload.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
    }

    /// Skip progress events and wait for the response body.
    ///
    /// # Errors
    ///
    /// Returns the terminal error of the upload.
    pub async fn completion(self) -> Result<Bytes> {
        self.stream.completion().await
    }

    /// Split into the event stream and its cancel handle.
    #[must_use]
    pub fn into_parts(self) -> (UploadStream, CancelHandle) {
        (self.stream, self.cancel)
    }
}

impl Stream for Upload {
    type Item = Result<UploadEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().stream).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use assert2::{check, let_assert};
    use courier_core::{Request, Response};
    use futures_util::StreamExt;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    /// Replies with a canned response and records requests.
    #[derive(Debug, Default)]
    struct Canned {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<Request<Bytes>>>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                seen: Mutex::default(),
            }
        }
    }

    impl HttpClient for Canned {
        async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
            if let Some(reporter) = request.extensions().get::<courier_core::ProgressReporter>() {
                let len = request.body().map_or(0, |body| body.len() as u64);
                reporter.report(len, len);
            }
            self.seen.lock().expect("lock").push(request);
            Ok(Response::new(
                self.status,
                HashMap::new(),
                Bytes::from_static(self.body.as_bytes()),
            ))
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u64,
    }

    fn client(transport: Canned) -> Client<Canned> {
        let config = ClientConfig::builder()
            .base_url("https://api.example.com")
            .header("Accept", "application/json")
            .default_collection_keypath("objects")
            .build();
        Client::with_transport(config, transport)
    }

    #[test]
    fn request_is_prefilled() {
        let client = client(Canned::new(200, ""));
        let request = client
            .request(Method::Get, "/users", Params::new().with("page", 2))
            .build()
            .expect("request");

        check!(request.url().as_str() == "https://api.example.com/users?page=2");
        check!(request.header("accept") == Some("application/json"));
        check!(request.timeout() == Some(client.config().timeout));
    }

    #[tokio::test]
    async fn models_use_configured_keypath() {
        let client = client(Canned::new(200, r#"{"objects": [{"id": 1}, {"id": 2}]}"#));
        let users: Vec<User> = client
            .get_models("/users", Params::new(), None)
            .await
            .expect("users");
        check!(users == vec![User { id: 1 }, User { id: 2 }]);
    }

    #[tokio::test]
    async fn root_model_decodes_from_body() {
        let client = client(Canned::new(200, r#"{"id": 7}"#));
        let user: User = client
            .get_model("/users/7", Params::new(), None)
            .await
            .expect("user");
        check!(user == User { id: 7 });
    }

    #[tokio::test]
    async fn root_model_error_names_field() {
        #[derive(Debug, Deserialize)]
        struct Account {
            #[allow(dead_code)]
            owner: User,
        }

        let client = client(Canned::new(200, r#"{"owner": {"id": "seven"}}"#));
        let result = client
            .get_model::<Account>("/accounts/1", Params::new(), None)
            .await;
        let_assert!(Err(Error::ParsingFailed { path, .. }) = result);
        check!(path == "owner.id");
    }

    #[tokio::test]
    async fn error_status_never_reaches_decoder() {
        let client = client(Canned::new(422, r#"{"id": 1}"#));
        let err = client
            .get_model::<User>("/users/1", Params::new(), None)
            .await
            .expect_err("unprocessable");
        check!(err.status() == Some(422));
        check!(err.payload() == Some(&json!({"id": 1})));
    }

    #[tokio::test]
    async fn void_ignores_body() {
        let client = client(Canned::new(204, ""));
        client
            .void(Method::Delete, "/users/1", Params::new())
            .await
            .expect("deleted");
    }

    #[tokio::test]
    async fn upload_reports_then_completes() {
        let client = client(Canned::new(201, "stored"));
        let upload = client.upload(
            Method::Post,
            "/files",
            Params::new(),
            vec![Attachment::new("file", "a.txt", "text/plain", "hello")],
        );

        let events: Vec<_> = upload.collect().await;
        check!(events.len() == 2);
        let_assert!(Some(Ok(UploadEvent::Progress(_))) = events.first());
        let_assert!(Some(Ok(UploadEvent::Completed(data))) = events.last());
        check!(data.as_ref() == b"stored");
    }

    #[tokio::test]
    async fn upload_with_bad_url_fails_once() {
        let config = ClientConfig::builder().base_url("not a url").build();
        let client = Client::with_transport(config, Canned::new(200, ""));

        let upload = client.upload(Method::Post, "/files", Params::new(), Vec::new());
        let events: Vec<_> = upload.collect().await;
        check!(events.len() == 1);
        let_assert!(Some(Err(Error::MalformedRequest(_))) = events.first());
    }
}
