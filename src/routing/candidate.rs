//! Route candidates competing for the same method and path.

use std::collections::BTreeSet;
use std::fmt;

use axum::http::Method;

use crate::routing::matcher::{Constraint, ConstraintKey};

/// Version metadata declared by a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpec {
    /// No version declared.
    Unversioned,
    /// Answers only to this version label.
    Exact(String),
    /// Answers to any requested version, including none.
    Neutral,
}

impl VersionSpec {
    pub fn exact(version: impl Into<String>) -> Self {
        VersionSpec::Exact(version.into())
    }

    pub fn is_versioned(&self) -> bool {
        !matches!(self, VersionSpec::Unversioned)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Unversioned => write!(f, "unversioned"),
            VersionSpec::Exact(v) => write!(f, "{}", v),
            VersionSpec::Neutral => write!(f, "neutral"),
        }
    }
}

/// Registration index of a candidate. Lower = registered earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteId(pub usize);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered (method, path, version, constraints, handler) tuple.
///
/// `H` is the handler reference handed back to the transport on a match.
/// Built with the chained setters below, then moved into the registry, after
/// which it is never modified.
#[derive(Clone)]
pub struct RouteCandidate<H> {
    pub(crate) id: RouteId,
    name: String,
    method: Method,
    path: String,
    version: VersionSpec,
    constraints: Vec<Constraint>,
    handler: H,
}

impl<H> RouteCandidate<H> {
    pub fn new(method: Method, path: impl Into<String>, handler: H) -> Self {
        let path = path.into();
        Self {
            id: RouteId(0),
            name: format!("{} {}", method, path),
            method,
            path,
            version: VersionSpec::Unversioned,
            constraints: Vec::new(),
            handler,
        }
    }

    /// Name used in logs and conflict errors. Defaults to "METHOD path".
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn version(mut self, version: VersionSpec) -> Self {
        self.version = version;
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version_spec(&self) -> &VersionSpec {
        &self.version
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// More constraints = more specific.
    pub fn specificity(&self) -> usize {
        self.constraints.len()
    }

    pub(crate) fn constraint_keys(&self) -> BTreeSet<ConstraintKey> {
        self.constraints.iter().map(Constraint::key).collect()
    }
}

impl<H> fmt::Debug for RouteCandidate<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteCandidate")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("version", &self.version)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}
