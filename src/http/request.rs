//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Extract routing-relevant information (method, path, headers, host)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Host taken from the `Host` header, falling back to the URI authority
//! - Port stripped from the host; host constraints compare names only

use axum::http::{header, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::RequestDescriptor;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID assigned by the middleware, or "-".
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Build the routing view of an HTTP request.
pub fn describe<B>(request: &Request<B>) -> RequestDescriptor {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .map(strip_port)
        .unwrap_or_default();

    RequestDescriptor::new(request.method().clone(), request.uri().path())
        .with_headers(request.headers().clone())
        .with_host(host)
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}
