//! Route resolution.
//!
//! # Responsibilities
//! - Resolve a request to exactly one candidate, or an explicit NoMatch
//! - Apply version precedence for the active versioning mode
//! - Pick the most specific candidate among survivors
//! - Raise the versioning-disabled advisory
//!
//! # Resolution Order
//! ```text
//! 1. extract requested version (and strip URI segment)
//! 2. candidates = registry[method][path]             → empty: NoMatch
//! 3. Disabled: survivors = Unversioned               (+ advisory if any versioned)
//!    Enabled:  survivors = Exact(requested) | Neutral (none requested: Neutral | Unversioned)
//! 4. drop survivors whose constraints do not all match
//! 5. most constraints wins, earliest registration breaks ties
//! 6. Enabled, version requested, nothing left: retry step 4-5 with Unversioned
//! 7. URI segment stripped, still NoMatch: retry from step 2 on the full path,
//!    no version requested
//! ```
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) in the number of candidates for one method + path
//! - Never mutates the registry, never returns an error for a miss

use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::candidate::{RouteCandidate, RouteId, VersionSpec};
use crate::routing::matcher::{self, Constraint};
use crate::routing::notifier::{Advisory, LogNotifier, Notifier};
use crate::routing::registry::{RegistryError, RouteRegistry, SealedRegistry};
use crate::routing::request::RequestDescriptor;
use crate::routing::version::{ResolvedVersion, VersionResolver, VersioningMode};

/// Outcome of resolving one request.
#[derive(Debug)]
pub enum ResolutionOutcome<'a, H> {
    Matched(&'a RouteCandidate<H>),
    NoMatch,
    /// Several candidates tie on specificity. Only produced by
    /// [`Router::resolve_strict`].
    AmbiguousMatch(Vec<&'a RouteCandidate<H>>),
}

impl<'a, H> ResolutionOutcome<'a, H> {
    pub fn matched(&self) -> Option<&'a RouteCandidate<H>> {
        match self {
            ResolutionOutcome::Matched(c) => Some(c),
            _ => None,
        }
    }

    /// Handler reference of the winning candidate.
    pub fn handler(&self) -> Option<&'a H> {
        self.matched().map(RouteCandidate::handler)
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, ResolutionOutcome::NoMatch)
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionOutcome::Matched(_) => "matched",
            ResolutionOutcome::NoMatch => "no_match",
            ResolutionOutcome::AmbiguousMatch(_) => "ambiguous",
        }
    }
}

// Outcomes are equal when they name the same registered candidates.
impl<H> PartialEq for ResolutionOutcome<'_, H> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ResolutionOutcome::Matched(a), ResolutionOutcome::Matched(b)) => a.id() == b.id(),
            (ResolutionOutcome::NoMatch, ResolutionOutcome::NoMatch) => true,
            (ResolutionOutcome::AmbiguousMatch(a), ResolutionOutcome::AmbiguousMatch(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.id() == y.id())
            }
            _ => false,
        }
    }
}

/// Two candidates that can both win the same request with equal specificity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub method: Method,
    pub path: String,
    /// Earlier registration; wins the tie at runtime.
    pub winner: (RouteId, String),
    pub shadowed: (RouteId, String),
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: '{}' shadows '{}' on equal specificity",
            self.method, self.path, self.winner.1, self.shadowed.1
        )
    }
}

/// Sealed routing table plus the frozen versioning mode.
pub struct Router<H> {
    mode: VersioningMode,
    routes: SealedRegistry<H>,
    notifier: Arc<dyn Notifier>,
}

impl<H> Router<H> {
    pub fn builder() -> RouterBuilder<H> {
        RouterBuilder::new()
    }

    pub fn mode(&self) -> &VersioningMode {
        &self.mode
    }

    pub fn routes(&self) -> &SealedRegistry<H> {
        &self.routes
    }

    /// Resolve a request. Ties are broken deterministically.
    pub fn resolve<'a>(&'a self, req: &RequestDescriptor) -> ResolutionOutcome<'a, H> {
        self.select(req, false)
    }

    /// Like [`resolve`](Self::resolve), but reports specificity ties as
    /// [`ResolutionOutcome::AmbiguousMatch`].
    pub fn resolve_strict<'a>(&'a self, req: &RequestDescriptor) -> ResolutionOutcome<'a, H> {
        self.select(req, true)
    }

    fn select<'a>(&'a self, req: &RequestDescriptor, strict: bool) -> ResolutionOutcome<'a, H> {
        let resolved = VersionResolver::resolve(&self.mode, req);
        let mut outcome = self.resolve_path(req, &resolved, strict);

        // `/videos` under prefix `v` is a path, not version `ideos`.
        if outcome.is_no_match() && resolved.path != req.path() {
            let unstripped = ResolvedVersion {
                requested: None,
                path: req.path(),
            };
            outcome = self.resolve_path(req, &unstripped, strict);
        }

        tracing::debug!(
            method = %req.method(),
            path = %req.path(),
            host = %req.host(),
            requested_version = ?resolved.requested,
            outcome = outcome.label(),
            route = outcome.matched().map(RouteCandidate::name).unwrap_or("-"),
            "Request resolved"
        );
        outcome
    }

    fn resolve_path<'a>(
        &'a self,
        req: &RequestDescriptor,
        resolved: &ResolvedVersion<'_>,
        strict: bool,
    ) -> ResolutionOutcome<'a, H> {
        let candidates = self.routes.lookup(req.method(), resolved.path);
        if candidates.is_empty() {
            tracing::trace!(method = %req.method(), path = %resolved.path, "No candidates for path");
            return ResolutionOutcome::NoMatch;
        }

        if !self.mode.is_enabled() {
            let versioned = candidates
                .iter()
                .filter(|c| c.version_spec().is_versioned())
                .count();
            if versioned > 0 {
                self.notifier.advise(Advisory::versioning_disabled(req, versioned));
            }
            return pick(candidates.iter().filter(|c| is_unversioned(*c)), req, strict);
        }

        let requested = resolved.requested.as_deref();
        let outcome = pick(
            candidates
                .iter()
                .filter(|c| self.accepts(c.version_spec(), requested)),
            req,
            strict,
        );
        if outcome.is_no_match() && requested.is_some() {
            pick(candidates.iter().filter(|c| is_unversioned(*c)), req, strict)
        } else {
            outcome
        }
    }

    fn accepts(&self, spec: &VersionSpec, requested: Option<&str>) -> bool {
        match (spec, requested) {
            (VersionSpec::Neutral, _) => true,
            (VersionSpec::Exact(label), Some(requested)) => {
                label == requested || self.mode.canonical(label) == requested
            }
            (VersionSpec::Unversioned, None) => true,
            _ => false,
        }
    }

    /// List candidate pairs that could tie at runtime under the active mode.
    pub fn audit(&self) -> Vec<Ambiguity> {
        let mut found = Vec::new();
        for group in self.routes.groups() {
            for (i, first) in group.iter().enumerate() {
                for second in &group[i + 1..] {
                    if first.specificity() == second.specificity()
                        && self.versions_overlap(first.version_spec(), second.version_spec())
                        && hosts_compatible(first.constraints(), second.constraints())
                    {
                        found.push(Ambiguity {
                            method: first.method().clone(),
                            path: first.path().to_string(),
                            winner: (first.id(), first.name().to_string()),
                            shadowed: (second.id(), second.name().to_string()),
                        });
                    }
                }
            }
        }
        found.sort_by_key(|a| a.winner.0);
        found
    }

    fn versions_overlap(&self, a: &VersionSpec, b: &VersionSpec) -> bool {
        if !self.mode.is_enabled() {
            return !a.is_versioned() && !b.is_versioned();
        }
        match (a, b) {
            (VersionSpec::Neutral, _) | (_, VersionSpec::Neutral) => true,
            (VersionSpec::Exact(x), VersionSpec::Exact(y)) => {
                self.mode.canonical(x) == self.mode.canonical(y)
            }
            (VersionSpec::Unversioned, VersionSpec::Unversioned) => true,
            _ => false,
        }
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("mode", &self.mode)
            .field("routes", &self.routes.len())
            .field("notifier", &self.notifier)
            .finish()
    }
}

fn is_unversioned<H>(candidate: &RouteCandidate<H>) -> bool {
    !candidate.version_spec().is_versioned()
}

/// Two constraint lists can both match one request unless they pin different hosts.
fn hosts_compatible(a: &[Constraint], b: &[Constraint]) -> bool {
    let host = |cs: &[Constraint]| {
        cs.iter().find_map(|c| match c {
            Constraint::Host(m) => Some(m.host().to_string()),
            Constraint::Custom(_) => None,
        })
    };
    match (host(a), host(b)) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

/// Constraint filter plus specificity selection over survivors in
/// registration order.
fn pick<'a, H, I>(survivors: I, req: &RequestDescriptor, strict: bool) -> ResolutionOutcome<'a, H>
where
    I: Iterator<Item = &'a RouteCandidate<H>>,
    H: 'a,
{
    let mut best: Option<&'a RouteCandidate<H>> = None;
    let mut tied: Vec<&'a RouteCandidate<H>> = Vec::new();

    for candidate in survivors {
        if !matcher::all_match(candidate.constraints(), req) {
            tracing::trace!(route = %candidate.name(), "Constraints rejected candidate");
            continue;
        }
        match best {
            Some(current) if candidate.specificity() < current.specificity() => {}
            Some(current) if candidate.specificity() == current.specificity() => {
                if strict {
                    tied.push(candidate);
                }
            }
            _ => {
                best = Some(candidate);
                if strict {
                    tied.clear();
                    tied.push(candidate);
                }
            }
        }
    }

    match best {
        None => ResolutionOutcome::NoMatch,
        Some(_) if tied.len() > 1 => ResolutionOutcome::AmbiguousMatch(tied),
        Some(winner) => ResolutionOutcome::Matched(winner),
    }
}

/// Startup-phase builder. `build` seals the registry and freezes the mode.
pub struct RouterBuilder<H> {
    registry: RouteRegistry<H>,
    mode: Option<VersioningMode>,
    notifier: Arc<dyn Notifier>,
}

impl<H> Default for RouterBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouterBuilder<H> {
    pub fn new() -> Self {
        Self {
            registry: RouteRegistry::new(),
            mode: None,
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Choose the versioning mode. Allowed once.
    pub fn enable_versioning(&mut self, mode: VersioningMode) -> Result<&mut Self, RegistryError> {
        if let Some(existing) = &self.mode {
            return Err(RegistryError::VersioningAlreadyConfigured(existing.kind()));
        }
        tracing::info!(mode = mode.kind(), "Versioning configured");
        self.mode = Some(mode);
        Ok(self)
    }

    pub fn notifier(&mut self, notifier: Arc<dyn Notifier>) -> &mut Self {
        self.notifier = notifier;
        self
    }

    pub fn register(&mut self, candidate: RouteCandidate<H>) -> Result<RouteId, RegistryError> {
        self.registry.register(candidate)
    }

    /// Seal the registry. Mode defaults to Disabled when never enabled.
    pub fn build(self) -> Router<H> {
        let router = Router {
            mode: self.mode.unwrap_or_default(),
            routes: self.registry.seal(),
            notifier: self.notifier,
        };
        for ambiguity in router.audit() {
            tracing::warn!(%ambiguity, "Ambiguous routes resolved by registration order");
        }
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::notifier::ChannelNotifier;

    type TestRouter = Router<&'static str>;

    fn get(path: &str) -> RequestDescriptor {
        RequestDescriptor::new(Method::GET, path).with_host("localhost")
    }

    fn build(mode: Option<VersioningMode>, routes: Vec<RouteCandidate<&'static str>>) -> TestRouter {
        let mut builder = Router::builder();
        if let Some(mode) = mode {
            builder.enable_versioning(mode).unwrap();
        }
        for route in routes {
            builder.register(route).unwrap();
        }
        builder.build()
    }

    fn greet(handler: &'static str, version: VersionSpec) -> RouteCandidate<&'static str> {
        RouteCandidate::new(Method::GET, "/greet", handler)
            .named(handler)
            .version(version)
    }

    #[test]
    fn test_empty_lookup_is_no_match() {
        let router = build(None, vec![greet("a", VersionSpec::Unversioned)]);
        assert_eq!(router.resolve(&get("/missing")), ResolutionOutcome::NoMatch);
        let post = RequestDescriptor::new(Method::POST, "/greet");
        assert!(router.resolve(&post).is_no_match());
    }

    #[test]
    fn test_enable_versioning_only_once() {
        let mut builder: RouterBuilder<()> = Router::builder();
        builder.enable_versioning(VersioningMode::uri()).unwrap();
        let err = builder
            .enable_versioning(VersioningMode::header("Accept-Version"))
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::VersioningAlreadyConfigured("uri")));
        assert_eq!(builder.build().mode().kind(), "uri");
    }

    #[test]
    fn test_disabled_mode_picks_first_unversioned() {
        let router = build(
            None,
            vec![
                greet("v1", VersionSpec::exact("v1")),
                greet("plain", VersionSpec::Unversioned),
                RouteCandidate::new(Method::GET, "/greet", "plain-de")
                    .named("plain-de")
                    .constraint(Constraint::host("de.example.com")),
            ],
        );

        let req = get("/greet").with_header("Accept-Version", "v1");
        assert_eq!(router.resolve(&req).handler(), Some(&"plain"));

        // More specific unversioned candidate wins when its host matches.
        let de = get("/greet").with_host("de.example.com");
        assert_eq!(router.resolve(&de).handler(), Some(&"plain-de"));
    }

    #[test]
    fn test_disabled_mode_without_unversioned_is_no_match() {
        let mut builder = Router::builder();
        let (notifier, mut rx) = ChannelNotifier::channel(8);
        builder.notifier(Arc::new(notifier));
        builder.register(greet("v1", VersionSpec::exact("v1"))).unwrap();
        builder.register(greet("any", VersionSpec::Neutral)).unwrap();
        let router = builder.build();

        assert!(router.resolve(&get("/greet")).is_no_match());
        let advisory = rx.try_recv().unwrap();
        assert_eq!(advisory.detail, "2 candidate(s) declare version metadata");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_no_advisory_without_versioned_siblings() {
        let mut builder = Router::builder();
        let (notifier, mut rx) = ChannelNotifier::channel(8);
        builder.notifier(Arc::new(notifier));
        builder.register(greet("plain", VersionSpec::Unversioned)).unwrap();
        builder
            .register(RouteCandidate::new(Method::GET, "/other", "v1").version(VersionSpec::exact("v1")))
            .unwrap();
        let router = builder.build();

        assert_eq!(router.resolve(&get("/greet")).handler(), Some(&"plain"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_header_mode_exact_and_neutral() {
        let router = build(
            Some(VersioningMode::header("Accept-Version")),
            vec![
                greet("v1", VersionSpec::exact("v1")),
                greet("v2", VersionSpec::exact("v2")),
            ],
        );

        let v2 = get("/greet").with_header("accept-version", "v2");
        assert_eq!(router.resolve(&v2).handler(), Some(&"v2"));

        let v9 = get("/greet").with_header("accept-version", "v9");
        assert!(router.resolve(&v9).is_no_match());

        assert!(router.resolve(&get("/greet")).is_no_match());
    }

    #[test]
    fn test_neutral_matches_without_requested_version() {
        let router = build(
            Some(VersioningMode::header("Accept-Version")),
            vec![
                greet("v1", VersionSpec::exact("v1")),
                greet("neutral", VersionSpec::Neutral),
            ],
        );
        assert_eq!(router.resolve(&get("/greet")).handler(), Some(&"neutral"));

        // Equal specificity: earlier registration wins.
        let v1 = get("/greet").with_header("accept-version", "v1");
        assert_eq!(router.resolve(&v1).handler(), Some(&"v1"));
    }

    #[test]
    fn test_unversioned_catch_all_tier() {
        let router = build(
            Some(VersioningMode::header("Accept-Version")),
            vec![
                greet("fallback", VersionSpec::Unversioned),
                greet("v1", VersionSpec::exact("v1")),
            ],
        );

        let v1 = get("/greet").with_header("accept-version", "v1");
        assert_eq!(router.resolve(&v1).handler(), Some(&"v1"));

        let v7 = get("/greet").with_header("accept-version", "v7");
        assert_eq!(router.resolve(&v7).handler(), Some(&"fallback"));

        assert_eq!(router.resolve(&get("/greet")).handler(), Some(&"fallback"));
    }

    #[test]
    fn test_uri_mode_strips_segment_and_canonicalizes() {
        let router = build(
            Some(VersioningMode::uri()),
            vec![
                greet("v1", VersionSpec::exact("v1")),
                greet("v2", VersionSpec::exact("2")),
            ],
        );

        assert_eq!(router.resolve(&get("/v1/greet")).handler(), Some(&"v1"));
        assert_eq!(router.resolve(&get("/v2/greet")).handler(), Some(&"v2"));
        assert!(router.resolve(&get("/greet")).is_no_match());
        assert!(router.resolve(&get("/v3/greet")).is_no_match());
    }

    #[test]
    fn test_uri_mode_prefixed_paths_stay_reachable() {
        let router = build(
            Some(VersioningMode::uri()),
            vec![
                RouteCandidate::new(Method::GET, "/videos", "videos").named("videos"),
                RouteCandidate::new(Method::GET, "/version", "version")
                    .named("version")
                    .version(VersionSpec::Neutral),
                greet("v1", VersionSpec::exact("v1")),
                RouteCandidate::new(Method::GET, "/", "root").version(VersionSpec::exact("v1")),
            ],
        );

        assert_eq!(router.resolve(&get("/videos")).handler(), Some(&"videos"));
        assert_eq!(router.resolve(&get("/videos/")).handler(), Some(&"videos"));
        assert_eq!(router.resolve(&get("/version")).handler(), Some(&"version"));
        assert_eq!(router.resolve(&get("/v1/greet")).handler(), Some(&"v1"));
        assert_eq!(router.resolve(&get("/v1")).handler(), Some(&"root"));
        // Unversioned catch-all under a real version segment.
        assert_eq!(router.resolve(&get("/v1/videos")).handler(), Some(&"videos"));
        assert!(router.resolve(&get("/vinyl")).is_no_match());
    }

    #[test]
    fn test_custom_mode() {
        let router = build(
            Some(VersioningMode::custom(|req| {
                req.header("x-client").map(|c| if c == "legacy" { "v1".into() } else { "v2".into() })
            })),
            vec![
                greet("v1", VersionSpec::exact("v1")),
                greet("v2", VersionSpec::exact("v2")),
            ],
        );

        let legacy = get("/greet").with_header("x-client", "legacy");
        let modern = get("/greet").with_header("x-client", "app");
        assert_eq!(router.resolve(&legacy).handler(), Some(&"v1"));
        assert_eq!(router.resolve(&modern).handler(), Some(&"v2"));
    }

    #[test]
    fn test_more_constraints_win() {
        let router = build(
            Some(VersioningMode::header("Accept-Version")),
            vec![
                greet("generic", VersionSpec::exact("v1")),
                greet("de", VersionSpec::exact("v1")).constraint(Constraint::host("de.example.com")),
            ],
        );

        let de = get("/greet")
            .with_host("de.example.com")
            .with_header("accept-version", "v1");
        assert_eq!(router.resolve(&de).handler(), Some(&"de"));

        let other = get("/greet")
            .with_host("fr.example.com")
            .with_header("accept-version", "v1");
        assert_eq!(router.resolve(&other).handler(), Some(&"generic"));
    }

    #[test]
    fn test_strict_reports_ties() {
        let router = build(
            Some(VersioningMode::header("Accept-Version")),
            vec![
                greet("v1", VersionSpec::exact("v1")),
                greet("neutral", VersionSpec::Neutral),
            ],
        );
        let req = get("/greet").with_header("accept-version", "v1");

        match router.resolve_strict(&req) {
            ResolutionOutcome::AmbiguousMatch(tied) => {
                let names: Vec<_> = tied.iter().map(|c| c.name()).collect();
                assert_eq!(names, vec!["v1", "neutral"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
        assert_eq!(router.resolve(&req).handler(), Some(&"v1"));
    }

    #[test]
    fn test_audit_lists_overlaps() {
        let router = build(
            Some(VersioningMode::uri()),
            vec![
                greet("v1", VersionSpec::exact("v1")),
                greet("one", VersionSpec::exact("1")),
                greet("v2", VersionSpec::exact("v2")),
                greet("de", VersionSpec::Neutral).constraint(Constraint::host("de.example.com")),
                greet("ar", VersionSpec::Neutral).constraint(Constraint::host("ar.example.com")),
            ],
        );

        let audit = router.audit();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].winner.1, "v1");
        assert_eq!(audit[0].shadowed.1, "one");
    }

    #[derive(Clone, Default)]
    struct WarnCounter(Arc<std::sync::atomic::AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
        }
    }

    #[test]
    fn test_build_warns_on_overlapping_labels() {
        use tracing_subscriber::layer::SubscriberExt;

        let counter = WarnCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        tracing::subscriber::with_default(subscriber, || {
            build(
                Some(VersioningMode::uri()),
                vec![
                    greet("v1", VersionSpec::exact("v1")),
                    greet("one", VersionSpec::exact("1")),
                    greet("v2", VersionSpec::exact("v2")),
                ],
            )
        });
        assert_eq!(counter.0.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let router = build(
            Some(VersioningMode::header("Accept-Version")),
            vec![
                greet("v1", VersionSpec::exact("v1")),
                greet("de", VersionSpec::exact("v3")).constraint(Constraint::host("de.example.com")),
            ],
        );
        let req = get("/greet")
            .with_host("de.example.com")
            .with_header("accept-version", "v3");

        let first = router.resolve(&req);
        let second = router.resolve(&req);
        assert_eq!(first, second);
        assert_eq!(first.handler(), Some(&"de"));
    }
}
