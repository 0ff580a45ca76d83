//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier::prelude::*;
//! ```

pub use crate::{
    Attachment, Client, ClientConfig, Error, HttpClient, HyperClient, Method, ParameterEncoding,
    Params, Result, Service, Upload, UploadEvent,
};
pub use futures_util::StreamExt;
pub use serde::{Deserialize, Serialize};
