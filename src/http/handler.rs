//! Handler references stored in route candidates.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Json, Response},
};
use futures_util::future::{BoxFuture, FutureExt};

pub type HandlerFuture = BoxFuture<'static, Response>;

type HandlerFn = dyn Fn(Request<Body>) -> HandlerFuture + Send + Sync;

/// Cheaply cloneable reference to request handling logic.
#[derive(Clone)]
pub struct HttpHandler {
    inner: Arc<HandlerFn>,
}

impl HttpHandler {
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        Self {
            inner: Arc::new(move |req| f(req).map(IntoResponse::into_response).boxed()),
        }
    }

    /// Handler that always answers with the same JSON body.
    pub fn json(body: serde_json::Value) -> Self {
        Self::new(move |_req| {
            let body = body.clone();
            async move { Json(body) }
        })
    }

    pub fn call(&self, req: Request<Body>) -> HandlerFuture {
        (self.inner)(req)
    }
}

impl fmt::Debug for HttpHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HttpHandler(..)")
    }
}
