//! Request descriptor consumed by the routing engine.
//!
//! The transport builds one of these per request; the engine only reads it.

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Already-parsed view of an incoming request.
///
/// Header lookups are case-insensitive. When a header carries several values
/// the first one wins.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    headers: HeaderMap,
    host: String,
}

impl RequestDescriptor {
    /// Create a descriptor with no headers and an empty host.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            host: String::new(),
        }
    }

    /// Set the request host. Stored lowercase.
    pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
        self.host = host.as_ref().to_ascii_lowercase();
        self
    }

    /// Append a header value. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Replace the whole header map.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of the named header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = RequestDescriptor::new(Method::GET, "/greet")
            .with_header("Accept-Version", "v1");

        assert_eq!(req.header("accept-version"), Some("v1"));
        assert_eq!(req.header("ACCEPT-VERSION"), Some("v1"));
        assert_eq!(req.header("x-other"), None);
    }

    #[test]
    fn test_first_header_value_wins() {
        let req = RequestDescriptor::new(Method::GET, "/greet")
            .with_header("accept-version", "v2")
            .with_header("Accept-Version", "v1");

        assert_eq!(req.header("accept-version"), Some("v2"));
    }

    #[test]
    fn test_host_is_lowercased() {
        let req = RequestDescriptor::new(Method::GET, "/").with_host("DE.Example.com");
        assert_eq!(req.host(), "de.example.com");
    }
}
