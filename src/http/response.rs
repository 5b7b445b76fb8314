//! Response helpers.
//!
//! NoMatch becomes a problem-details 404 (RFC 9457).

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

pub const PROBLEM_JSON: &str = "application/problem+json";

/// Problem details body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

/// 404 for a request no candidate accepted.
pub fn not_found(method: &Method, path: &str) -> Response {
    let problem = Problem {
        kind: "not-found".to_string(),
        title: "Not Found".to_string(),
        status: StatusCode::NOT_FOUND.as_u16(),
        detail: format!("Cannot {} {}", method, path),
    };
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, PROBLEM_JSON)],
        Json(problem),
    )
        .into_response()
}
