//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, headers, host)
//!     → version.rs (extract requested version, strip URI version segment)
//!     → registry.rs (candidates for method + path, registration order)
//!     → matcher.rs (evaluate host / custom constraints)
//!     → router.rs (version precedence, specificity, tie-break)
//!     → Return: Matched(candidate) or NoMatch
//!     ↘ notifier.rs (advisory when versioning is disabled but routes declare versions)
//!
//! Route Compilation (at startup):
//!     RouteCandidate[]
//!     → register() (conflicts rejected eagerly)
//!     → enable_versioning() (at most once)
//!     → build(): seal registry, freeze versioning mode
//!     → immutable Router shared via Arc
//! ```
//!
//! # Design Decisions
//! - Routes sealed at startup, immutable at runtime
//! - No regex in hot path (exact segment and host equality only)
//! - Deterministic: same input always resolves to the same candidate
//! - Explicit NoMatch rather than an error or silent default

pub mod candidate;
pub mod matcher;
pub mod notifier;
pub mod registry;
pub mod request;
pub mod router;
pub mod version;

pub use candidate::{RouteCandidate, RouteId, VersionSpec};
pub use matcher::{Constraint, CustomMatcher, HostMatcher, Matcher};
pub use notifier::{Advisory, AdvisoryKind, ChannelNotifier, LogNotifier, Notifier};
pub use registry::{RegistryError, RouteRegistry, SealedRegistry};
pub use request::RequestDescriptor;
pub use router::{Ambiguity, ResolutionOutcome, Router, RouterBuilder};
pub use version::{ResolvedVersion, VersionResolver, VersioningMode};
