//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing + http subsystems produce:
//!     → logging.rs (structured log events, advisories at WARN)
//!     → metrics.rs (resolution and advisory counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the HTTP layer spans
//! - Metrics are cheap (atomic increments) and no-ops without a recorder

pub mod logging;
pub mod metrics;
