//! Route constraint matching.
//!
//! # Responsibilities
//! - Match request host (exact match, case-insensitive)
//! - Evaluate externally supplied predicates
//! - Combine a candidate's constraints with AND semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - No wildcard hosts, no regex: O(n) in the host length
//! - A panicking predicate counts as "does not match", never propagates
//! - Empty constraint list = always matches

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::routing::request::RequestDescriptor;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &RequestDescriptor) -> bool;
}

/// Matches the request host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_ascii_lowercase(),
        }
    }

    pub fn host(&self) -> &str {
        &self.expected_host
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        req.host().eq_ignore_ascii_case(&self.expected_host)
    }
}

type Predicate = dyn Fn(&RequestDescriptor) -> bool + Send + Sync;

/// Matches through an externally supplied predicate.
///
/// The name identifies the predicate when registrations are compared for
/// conflicts, so two custom matchers with the same name are considered the
/// same constraint.
#[derive(Clone)]
pub struct CustomMatcher {
    name: String,
    predicate: Arc<Predicate>,
}

impl CustomMatcher {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RequestDescriptor) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomMatcher")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Matcher for CustomMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (self.predicate)(req))) {
            Ok(matched) => matched,
            Err(_) => {
                tracing::warn!(
                    constraint = %self.name,
                    path = %req.path(),
                    "Custom constraint panicked, treating as no match"
                );
                false
            }
        }
    }
}

/// A per-candidate condition narrowing which requests it accepts.
#[derive(Debug, Clone)]
pub enum Constraint {
    Host(HostMatcher),
    Custom(CustomMatcher),
}

impl Constraint {
    pub fn host(host: impl Into<String>) -> Self {
        Constraint::Host(HostMatcher::new(host))
    }

    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RequestDescriptor) -> bool + Send + Sync + 'static,
    {
        Constraint::Custom(CustomMatcher::new(name, predicate))
    }

    /// Identity used to compare constraint sets at registration time.
    pub fn key(&self) -> ConstraintKey {
        match self {
            Constraint::Host(m) => ConstraintKey::Host(m.host().to_string()),
            Constraint::Custom(m) => ConstraintKey::Custom(m.name().to_string()),
        }
    }
}

impl Matcher for Constraint {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        match self {
            Constraint::Host(m) => m.matches(req),
            Constraint::Custom(m) => m.matches(req),
        }
    }
}

/// Comparable identity of a [`Constraint`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstraintKey {
    Host(String),
    Custom(String),
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKey::Host(h) => write!(f, "host={}", h),
            ConstraintKey::Custom(n) => write!(f, "custom={}", n),
        }
    }
}

/// Returns true when every constraint matches (AND). Empty = match.
pub fn all_match(constraints: &[Constraint], req: &RequestDescriptor) -> bool {
    constraints.iter().all(|c| c.matches(req))
}
