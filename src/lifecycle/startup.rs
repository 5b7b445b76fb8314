//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn the loaded configuration into a sealed Router
//! - Register the bundled application routes
//!
//! # Design Decisions
//! - Fail fast: a conflicting registration is fatal
//! - Versioning is enabled before any route is registered

use std::sync::Arc;

use crate::app;
use crate::config::ServerConfig;
use crate::http::HttpHandler;
use crate::routing::{Notifier, RegistryError, Router};

/// Build the application router for `config`.
pub fn build_router(
    config: &ServerConfig,
    notifier: Arc<dyn Notifier>,
) -> Result<Router<HttpHandler>, RegistryError> {
    let mut builder = Router::builder();
    builder.notifier(notifier);

    let mode = config.versioning.to_mode();
    if mode.is_enabled() {
        builder.enable_versioning(mode)?;
    }

    app::greet::register(&mut builder)?;

    let router = builder.build();
    tracing::info!(
        routes = router.routes().len(),
        versioning = router.mode().kind(),
        "Router ready"
    );
    Ok(router)
}
