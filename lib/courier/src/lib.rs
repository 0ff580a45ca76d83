//! Async HTTP client with typed decoding and multipart upload progress.
//!
//! Describe a call with a route, a verb and [`Params`]; the client builds a
//! wire-correct request, executes it with [`HyperClient`], validates the
//! status and decodes the body.
//!
//! # Example
//!
//! ```no_run
//! use courier::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! # async fn run() -> courier::Result<()> {
//! let client = Client::new(
//!     ClientConfig::builder()
//!         .base_url("https://api.example.com")
//!         .build(),
//! );
//!
//! let user: User = client.get_model("/users/42", Params::new(), None).await?;
//!
//! let mut upload = client.upload(
//!     Method::Post,
//!     "/avatars",
//!     Params::new().with("user", 42),
//!     vec![Attachment::file("avatar", "me.png", std::fs::read("me.png").unwrap_or_default())],
//! );
//! while let Some(event) = upload.next().await {
//!     if let UploadEvent::Progress(progress) = event? {
//!         println!("{:.0}%", progress.fraction() * 100.0);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod api_client;
mod body;
mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;
mod service;

pub use api_client::{CancelHandle, Client, Upload};
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use service::Service;

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use courier_core::{
    ArrayEncoding, Attachment, ContentType, DeliveryContext, DeliveryTask, Error, HttpClient,
    Inline, JsonObject, JsonValue, Method, ModelDecoder, ParamValue, ParameterEncoding, Params,
    Parser, Progress, ProgressReporter, Request, RequestBuilder, RequestDescriptor, ResourceBundle,
    Response, Result, Scalar, SerdeDecoder, TransportFailure, UploadEvent, UploadStream, extract,
    extract_array, from_json, multipart, parse_json, progress_channel, validate,
};
