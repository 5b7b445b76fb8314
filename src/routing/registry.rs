//! Route registry.
//!
//! # Responsibilities
//! - Collect route candidates during startup
//! - Reject indistinguishable candidates eagerly
//! - Seal into an immutable snapshot before serving
//! - Look up candidates by method + path in registration order
//!
//! # Design Decisions
//! - Open → Sealed is one-way (`seal` consumes the open registry)
//! - O(1) lookup via nested HashMap (method, then normalized path)
//! - Exact segment equality, no path templates

use std::borrow::Cow;
use std::collections::HashMap;

use axum::http::Method;
use thiserror::Error;

use crate::routing::candidate::{RouteCandidate, RouteId, VersionSpec};

/// Errors raised while building the routing table. Fatal to startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Same method, path, version and constraint set already registered.
    #[error("Route conflict: '{name}' duplicates '{existing}' ({method} {path}, version {version})")]
    Conflict {
        method: Method,
        path: String,
        version: VersionSpec,
        existing: String,
        name: String,
    },

    /// Versioning mode may only be chosen once.
    #[error("Versioning already configured as '{0}'")]
    VersioningAlreadyConfigured(&'static str),
}

type PathTable<H> = HashMap<String, Vec<RouteCandidate<H>>>;

/// Open registry, populated during startup.
#[derive(Debug)]
pub struct RouteRegistry<H> {
    routes: HashMap<Method, PathTable<H>>,
    next_id: usize,
}

impl<H> Default for RouteRegistry<H> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<H> RouteRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate, assigning it the next [`RouteId`].
    pub fn register(&mut self, mut candidate: RouteCandidate<H>) -> Result<RouteId, RegistryError> {
        let path = normalize_path(candidate.path()).into_owned();
        let siblings = self
            .routes
            .entry(candidate.method().clone())
            .or_default()
            .entry(path.clone())
            .or_default();

        let keys = candidate.constraint_keys();
        if let Some(existing) = siblings
            .iter()
            .find(|c| c.version_spec() == candidate.version_spec() && c.constraint_keys() == keys)
        {
            return Err(RegistryError::Conflict {
                method: candidate.method().clone(),
                path,
                version: candidate.version_spec().clone(),
                existing: existing.name().to_string(),
                name: candidate.name().to_string(),
            });
        }

        let id = RouteId(self.next_id);
        self.next_id += 1;
        candidate.id = id;

        tracing::debug!(
            route = %candidate.name(),
            id = %id,
            method = %candidate.method(),
            path = %path,
            version = %candidate.version_spec(),
            constraints = candidate.specificity(),
            "Route registered"
        );

        siblings.push(candidate);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.next_id
    }

    pub fn is_empty(&self) -> bool {
        self.next_id == 0
    }

    /// Freeze the registry. No further registration is possible.
    pub fn seal(self) -> SealedRegistry<H> {
        tracing::info!(routes = self.next_id, "Route registry sealed");
        SealedRegistry {
            routes: self.routes,
            len: self.next_id,
        }
    }
}

/// Immutable snapshot of the registry, safe to share across threads.
#[derive(Debug)]
pub struct SealedRegistry<H> {
    routes: HashMap<Method, PathTable<H>>,
    len: usize,
}

impl<H> SealedRegistry<H> {
    /// Candidates for method + path, in registration order.
    pub fn lookup(&self, method: &Method, path: &str) -> &[RouteCandidate<H>] {
        let path = normalize_path(path);
        self.routes
            .get(method)
            .and_then(|paths| paths.get(path.as_ref()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every (method, path) group of candidates.
    pub fn groups(&self) -> impl Iterator<Item = &[RouteCandidate<H>]> {
        self.routes
            .values()
            .flat_map(|paths| paths.values())
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Collapse empty segments: `//greet/` → `/greet`.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let already_normal =
        path.starts_with('/') && !path.contains("//") && (path == "/" || !path.ends_with('/'));
    if already_normal {
        return Cow::Borrowed(path);
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    Cow::Owned(format!("/{}", segments.join("/")))
}
