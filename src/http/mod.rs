//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, build RequestDescriptor)
//!     → routing::Router::resolve
//!     → handler.rs (invoke matched handler with the original request)
//!     → response.rs (problem+json 404 on NoMatch)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::HttpHandler;
pub use request::{describe, MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
