//! Requested-version extraction.
//!
//! # Responsibilities
//! - Hold the process-wide versioning strategy
//! - Extract the requested version token from a request
//! - Strip the URI version segment before path lookup
//!
//! # Design Decisions
//! - Extraction only; precedence between candidates lives in router.rs
//! - Empty or whitespace values count as "none requested"
//! - Multiple header values: the first wins
//! - A panicking custom extractor counts as "none requested"

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::routing::request::RequestDescriptor;

/// Default URI version prefix (`/v1/...`).
pub const DEFAULT_URI_PREFIX: &str = "v";

/// Default version header.
pub const DEFAULT_VERSION_HEADER: &str = "Accept-Version";

type Extractor = dyn Fn(&RequestDescriptor) -> Option<String> + Send + Sync;

/// Strategy for extracting a requested version from a request.
///
/// Chosen once during startup and frozen into the [`Router`](crate::routing::Router).
#[derive(Clone, Default)]
pub enum VersioningMode {
    #[default]
    Disabled,
    /// First path segment `<prefix><token>`, e.g. `/v1/greet`.
    Uri { prefix: String },
    /// Value of the named request header.
    Header { name: String },
    /// Externally supplied extractor.
    Custom(Arc<Extractor>),
}

impl VersioningMode {
    /// URI versioning with the default `v` prefix.
    pub fn uri() -> Self {
        VersioningMode::Uri {
            prefix: DEFAULT_URI_PREFIX.to_string(),
        }
    }

    pub fn header(name: impl Into<String>) -> Self {
        VersioningMode::Header { name: name.into() }
    }

    pub fn custom<F>(extractor: F) -> Self
    where
        F: Fn(&RequestDescriptor) -> Option<String> + Send + Sync + 'static,
    {
        VersioningMode::Custom(Arc::new(extractor))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, VersioningMode::Disabled)
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            VersioningMode::Disabled => "disabled",
            VersioningMode::Uri { .. } => "uri",
            VersioningMode::Header { .. } => "header",
            VersioningMode::Custom(_) => "custom",
        }
    }

    /// Canonical form of a declared version label under this mode.
    ///
    /// URI tokens are extracted without the prefix, so a label declared as
    /// `v1` is compared as `1` when the prefix is `v`.
    pub fn canonical<'a>(&self, label: &'a str) -> &'a str {
        match self {
            VersioningMode::Uri { prefix } => label
                .strip_prefix(prefix.as_str())
                .filter(|rest| !rest.is_empty())
                .unwrap_or(label),
            _ => label,
        }
    }
}

impl fmt::Debug for VersioningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersioningMode::Disabled => write!(f, "Disabled"),
            VersioningMode::Uri { prefix } => f.debug_struct("Uri").field("prefix", prefix).finish(),
            VersioningMode::Header { name } => f.debug_struct("Header").field("name", name).finish(),
            VersioningMode::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Result of version extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion<'a> {
    /// Requested version token, `None` when nothing was requested.
    pub requested: Option<String>,
    /// Path to look up in the registry (URI version segment removed).
    pub path: &'a str,
}

/// Extracts the requested version according to a [`VersioningMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionResolver;

impl VersionResolver {
    pub fn resolve<'a>(mode: &VersioningMode, req: &'a RequestDescriptor) -> ResolvedVersion<'a> {
        let path = req.path();
        match mode {
            VersioningMode::Disabled => ResolvedVersion { requested: None, path },
            VersioningMode::Uri { prefix } => match split_version_segment(path, prefix) {
                Some((token, rest)) => ResolvedVersion {
                    requested: Some(token.to_string()),
                    path: rest,
                },
                None => ResolvedVersion { requested: None, path },
            },
            VersioningMode::Header { name } => ResolvedVersion {
                requested: non_empty(req.header(name)),
                path,
            },
            VersioningMode::Custom(extractor) => {
                let requested = match catch_unwind(AssertUnwindSafe(|| extractor(req))) {
                    Ok(token) => non_empty(token.as_deref()),
                    Err(_) => {
                        tracing::warn!(path = %path, "Version extractor panicked, treating as unversioned request");
                        None
                    }
                };
                ResolvedVersion { requested, path }
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Split `/<prefix><token>/rest` into (`token`, `/rest`).
fn split_version_segment<'a>(path: &'a str, prefix: &str) -> Option<(&'a str, &'a str)> {
    let trimmed = path.trim_start_matches('/');
    let (segment, rest) = match trimmed.find('/') {
        Some(idx) => (&trimmed[..idx], &trimmed[idx..]),
        None => (trimmed, "/"),
    };
    let token = segment.strip_prefix(prefix)?;
    if token.is_empty() {
        return None;
    }
    Some((token, rest))
}

/// Build a `Custom` mode reading a media-type parameter from `Accept`.
///
/// `Accept: application/json;v=2` yields `2` for key `v`. The first media
/// range carrying the parameter wins.
pub fn media_type_extractor(key: impl Into<String>) -> VersioningMode {
    let key = key.into();
    VersioningMode::custom(move |req| {
        let accept = req.header("accept")?;
        accept
            .split(',')
            .flat_map(|range| range.split(';').skip(1))
            .filter_map(|param| param.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(&key))
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
    })
}
