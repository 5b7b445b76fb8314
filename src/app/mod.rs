//! Bundled application routes.
//!
//! `greet` declares several handlers on the same method and path that differ
//! only by version and host, the case the routing engine exists for.

pub mod greet;
