//! Sugar for types that own a [`Client`].

use std::future::Future;

use bytes::Bytes;
use courier_core::{Attachment, HttpClient, Method, Params, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Client, Upload};

/// An API wrapper exposing the [`Client`] calls directly.
///
/// Implementors only provide [`network`](Self::network); every other
/// method forwards to it.
///
/// # Example
///
/// ```no_run
/// use courier::{Client, ClientConfig, Params, Service};
///
/// struct GitHub {
///     client: Client,
/// }
///
/// impl Service for GitHub {
///     type Transport = courier::HyperClient;
///
///     fn network(&self) -> &Client {
///         &self.client
///     }
/// }
///
/// # async fn run(github: GitHub) -> courier::Result<()> {
/// let zen = github.get("/zen", Params::new()).await?;
/// # Ok(())
/// # }
/// ```
pub trait Service: Send + Sync {
    /// Transport used by the client.
    type Transport: HttpClient + 'static;

    /// The client every call goes through.
    fn network(&self) -> &Client<Self::Transport>;

    /// See [`Client::data`].
    fn data(
        &self,
        method: Method,
        route: &str,
        params: Params,
    ) -> impl Future<Output = Result<Bytes>> + Send {
        self.network().data(method, route, params)
    }

    /// See [`Client::json`].
    fn json(
        &self,
        method: Method,
        route: &str,
        params: Params,
    ) -> impl Future<Output = Result<Value>> + Send {
        self.network().json(method, route, params)
    }

    /// See [`Client::void`].
    fn void(
        &self,
        method: Method,
        route: &str,
        params: Params,
    ) -> impl Future<Output = Result<()>> + Send {
        self.network().void(method, route, params)
    }

    /// See [`Client::model`].
    fn model<T: DeserializeOwned + Send>(
        &self,
        method: Method,
        route: &str,
        params: Params,
        keypath: Option<&str>,
    ) -> impl Future<Output = Result<T>> + Send {
        self.network().model(method, route, params, keypath)
    }

    /// See [`Client::models`].
    fn models<T: DeserializeOwned + Send>(
        &self,
        method: Method,
        route: &str,
        params: Params,
        keypath: Option<&str>,
    ) -> impl Future<Output = Result<Vec<T>>> + Send {
        self.network().models(method, route, params, keypath)
    }

    /// See [`Client::upload`].
    fn upload(
        &self,
        method: Method,
        route: &str,
        params: Params,
        attachments: Vec<Attachment>,
    ) -> Upload {
        self.network().upload(method, route, params, attachments)
    }

    /// See [`Client::get`].
    fn get(&self, route: &str, params: Params) -> impl Future<Output = Result<Bytes>> + Send {
        self.network().get(route, params)
    }

    /// See [`Client::post`].
    fn post(&self, route: &str, params: Params) -> impl Future<Output = Result<Bytes>> + Send {
        self.network().post(route, params)
    }

    /// See [`Client::put`].
    fn put(&self, route: &str, params: Params) -> impl Future<Output = Result<Bytes>> + Send {
        self.network().put(route, params)
    }

    /// See [`Client::patch`].
    fn patch(&self, route: &str, params: Params) -> impl Future<Output = Result<Bytes>> + Send {
        self.network().patch(route, params)
    }

    /// See [`Client::delete`].
    fn delete(&self, route: &str, params: Params) -> impl Future<Output = Result<Bytes>> + Send {
        self.network().delete(route, params)
    }
}
