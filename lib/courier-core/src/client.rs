//! Transport trait.
//!
//! [`HttpClient`] is the seam between request assembly and the network:
//! the core builds a [`Request`], a transport executes it. Implement it to
//! plug in another HTTP stack or a test double.

use std::future::Future;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Core HTTP client trait.
///
/// A transport executes exactly one network call per request. Retries,
/// caching, and connection reuse are its own business.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response, whatever its status.
    ///
    /// If the request carries a [`crate::ProgressReporter`] extension, the
    /// transport reports body upload progress through it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] when no response could be
    /// obtained (connection, TLS, timeout, cancellation, I/O).
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}
