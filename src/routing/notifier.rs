//! Advisory notifications.
//!
//! # Responsibilities
//! - Report "versioned routes hit while versioning is disabled"
//! - Hand advisories to the logging sink without blocking resolution
//!
//! # Design Decisions
//! - Fire-and-forget: `try_send` on a bounded channel, drop when full
//! - At most one advisory per resolved request (enforced by router.rs)
//! - Never changes the resolution outcome

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::Method;
use tokio::sync::{broadcast, mpsc};

use crate::observability::metrics;
use crate::routing::request::RequestDescriptor;

/// Stable advisory text for the versioning-disabled condition.
pub const VERSIONING_DISABLED_MESSAGE: &str = "Versioning must be enabled to use this functionality!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvisoryKind {
    /// Candidates declare versions but the versioning mode is Disabled.
    VersioningDisabled,
}

impl AdvisoryKind {
    pub fn message(&self) -> &'static str {
        match self {
            AdvisoryKind::VersioningDisabled => VERSIONING_DISABLED_MESSAGE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryKind::VersioningDisabled => "versioning_disabled",
        }
    }
}

/// A single advisory event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub detail: String,
    pub method: Method,
    pub path: String,
}

impl Advisory {
    pub fn versioning_disabled(req: &RequestDescriptor, versioned_routes: usize) -> Self {
        Self {
            kind: AdvisoryKind::VersioningDisabled,
            detail: format!("{} candidate(s) declare version metadata", versioned_routes),
            method: req.method().clone(),
            path: req.path().to_string(),
        }
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

/// Receives advisories from the router. Must not block.
pub trait Notifier: Send + Sync + fmt::Debug {
    fn advise(&self, advisory: Advisory);
}

/// Hands advisories to an asynchronous consumer over a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Advisory>,
    dropped: Arc<AtomicU64>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end for [`run_advisory_sink`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Advisory>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    /// Advisories discarded because the channel was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Notifier for ChannelNotifier {
    fn advise(&self, advisory: Advisory) {
        metrics::record_advisory(advisory.kind);
        if let Err(e) = self.tx.try_send(advisory) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            metrics::record_advisory_dropped();
            tracing::trace!(error = %e, "Advisory dropped");
        }
    }
}

/// Logs advisories inline through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn advise(&self, advisory: Advisory) {
        metrics::record_advisory(advisory.kind);
        log_advisory(&advisory);
    }
}

fn log_advisory(advisory: &Advisory) {
    tracing::warn!(
        kind = advisory.kind.as_str(),
        method = %advisory.method,
        path = %advisory.path,
        detail = %advisory.detail,
        "{}",
        advisory.message()
    );
}

/// Drain advisories into the log until shutdown or until every sender is gone.
pub async fn run_advisory_sink(
    mut rx: mpsc::Receiver<Advisory>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            next = rx.recv() => match next {
                Some(advisory) => log_advisory(&advisory),
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }

    while let Ok(advisory) = rx.try_recv() {
        log_advisory(&advisory);
    }
    tracing::debug!("Advisory sink stopped");
}
