//! Versioned HTTP route resolution.
//!
//! Resolves a request to exactly one handler when several handlers share the
//! same method and path but differ by API version or host.

pub mod app;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{ResolutionOutcome, Router};
