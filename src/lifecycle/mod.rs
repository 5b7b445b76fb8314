//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → register routes → enable versioning → seal Router
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → drain advisory sink → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any registration conflict aborts startup
//! - The Router is sealed before the listener accepts traffic

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
