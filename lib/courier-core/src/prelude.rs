//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier_core::prelude::*;
//! ```

pub use crate::{
    ArrayEncoding, Attachment, Error, HttpClient, JsonValue, Method, ModelDecoder,
    ParameterEncoding, Params, Parser, Request, RequestDescriptor, Response, Result, UploadEvent,
    UploadStream,
};
