//! Core types for the courier HTTP client.
//!
//! This crate holds everything that does not touch the network:
//! - [`Params`] - ordered, loosely-typed request parameters
//! - [`encoding`] - query strings, URL-encoded and JSON bodies
//! - [`multipart`] - `multipart/form-data` bodies and [`Attachment`]
//! - [`RequestDescriptor`] and [`Request`] - request assembly
//! - [`validate`] and [`Response`] - status validation
//! - [`JsonValue`], [`extract`] and [`ResourceBundle`] - JSON navigation
//! - [`ModelDecoder`] and [`Parser`] - typed decoding at a keypath
//! - [`progress_channel`] - ordered upload progress stream
//! - [`HttpClient`] - the transport trait
//! - [`Error`] and [`Result`] - error handling

mod body;
mod client;
mod decode;
pub mod encoding;
mod error;
mod json;
mod method;
pub mod multipart;
mod params;
pub mod prelude;
mod progress;
mod request;
mod response;

pub use body::{ContentType, from_json, parse_json};
pub use client::HttpClient;
pub use decode::{ModelDecoder, Parser, SerdeDecoder};
pub use encoding::{ArrayEncoding, ParameterEncoding, encode_body, to_json_body, to_url_encoded};
pub use error::{Error, Result, TransportFailure};
pub use json::{JsonObject, JsonValue, ResourceBundle, extract, extract_array};
pub use method::Method;
pub use multipart::Attachment;
pub use params::{ParamValue, Params, Scalar};
pub use progress::{
    DeliveryContext, DeliveryTask, Inline, Progress, ProgressReporter, UploadEvent, UploadStream,
    progress_channel,
};
pub use request::{Request, RequestBuilder, RequestDescriptor, RequestParts};
pub use response::{Response, is_success, validate};
