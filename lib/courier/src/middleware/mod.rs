//! Tower middleware layers for the courier HTTP client.
//!
//! Layers wrap the transport service of [`crate::HyperClient`]. The first
//! layer added is the outermost one.
//!
//! # Example
//!
//! ```
//! use courier::HyperClient;
//! use courier::middleware::{LogLevel, LoggingLayer};
//!
//! let client = HyperClient::builder()
//!     .layer(LoggingLayer::with_level(LogLevel::Debug))
//!     .build();
//! # drop(client);
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};
