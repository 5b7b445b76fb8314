//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → VersioningConfig::to_mode() frozen into the Router
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the versioning mode never changes afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdvisoryConfig, ListenerConfig, LogFormat, ObservabilityConfig, ServerConfig, TimeoutConfig,
    VersioningConfig, VersioningType,
};
