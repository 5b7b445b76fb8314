//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum app with a single dispatching fallback
//! - Wire up middleware (request ID, tracing, timeout)
//! - Resolve each request through the routing engine
//! - Invoke the matched handler or answer 404

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::handler::HttpHandler;
use crate::http::request::{self, MakeRequestUuid};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::Router;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router<HttpHandler>>,
}

/// HTTP front end for a sealed [`Router`].
pub struct HttpServer {
    app: axum::Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(config: ServerConfig, router: Arc<Router<HttpHandler>>) -> Self {
        let app = Self::build_app(&config, AppState { router });
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, state: AppState) -> axum::Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = %request::request_id(req),
                    )
                }),
            )
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id());

        axum::Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(middleware)
    }

    /// Serve until the shutdown receiver fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Resolve the request and hand it to the winning handler.
async fn dispatch(State(state): State<AppState>, req: Request<Body>) -> Response {
    let descriptor = request::describe(&req);

    let handler = {
        let outcome = state.router.resolve(&descriptor);
        metrics::record_resolution(outcome.label(), state.router.mode().kind());
        outcome.handler().cloned()
    };

    match handler {
        Some(handler) => handler.call(req).await,
        None => {
            tracing::debug!(
                method = %descriptor.method(),
                path = %descriptor.path(),
                host = %descriptor.host(),
                "No route matched"
            );
            response::not_found(descriptor.method(), descriptor.path())
        }
    }
}
