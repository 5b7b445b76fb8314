//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::version::{self, VersioningMode};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Versioning strategy, fixed for the lifetime of the process.
    pub versioning: VersioningConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Advisory sink settings.
    pub advisories: AdvisoryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VersioningType {
    #[default]
    Disabled,
    Uri,
    Header,
    MediaType,
}

/// Versioning configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct VersioningConfig {
    /// Strategy: disabled, uri, header or media_type.
    #[serde(rename = "type")]
    pub kind: VersioningType,

    /// URI segment prefix (uri).
    pub prefix: String,

    /// Header carrying the version (header).
    pub header: String,

    /// `Accept` media-type parameter carrying the version (media_type).
    pub key: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            kind: VersioningType::Disabled,
            prefix: version::DEFAULT_URI_PREFIX.to_string(),
            header: version::DEFAULT_VERSION_HEADER.to_string(),
            key: "v".to_string(),
        }
    }
}

impl VersioningConfig {
    pub fn to_mode(&self) -> VersioningMode {
        match self.kind {
            VersioningType::Disabled => VersioningMode::Disabled,
            VersioningType::Uri => VersioningMode::Uri {
                prefix: self.prefix.clone(),
            },
            VersioningType::Header => VersioningMode::header(self.header.clone()),
            VersioningType::MediaType => version::media_type_extractor(self.key.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Advisory sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Bounded channel capacity between the router and the log sink.
    pub channel_capacity: usize,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds, enforced by the HTTP layer.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}
