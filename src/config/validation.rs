//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the settings of the selected versioning strategy
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::{ServerConfig, VersioningType};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("versioning.header must not be empty")]
    EmptyHeaderName,

    #[error("versioning.header '{0}' is not a valid header name")]
    InvalidHeaderName(String),

    #[error("versioning.prefix must not be empty")]
    EmptyUriPrefix,

    #[error("versioning.prefix '{0}' must not contain '/'")]
    InvalidUriPrefix(String),

    #[error("versioning.key must not be empty")]
    EmptyMediaTypeKey,

    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("advisories.channel_capacity must be greater than zero")]
    ZeroAdvisoryCapacity,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let versioning = &config.versioning;
    match versioning.kind {
        VersioningType::Disabled => {}
        VersioningType::Uri => {
            if versioning.prefix.is_empty() {
                errors.push(ValidationError::EmptyUriPrefix);
            } else if versioning.prefix.contains('/') {
                errors.push(ValidationError::InvalidUriPrefix(versioning.prefix.clone()));
            }
        }
        VersioningType::Header => {
            if versioning.header.trim().is_empty() {
                errors.push(ValidationError::EmptyHeaderName);
            } else if HeaderName::from_bytes(versioning.header.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidHeaderName(versioning.header.clone()));
            }
        }
        VersioningType::MediaType => {
            if versioning.key.trim().is_empty() {
                errors.push(ValidationError::EmptyMediaTypeKey);
            }
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }

    if config.advisories.channel_capacity == 0 {
        errors.push(ValidationError::ZeroAdvisoryCapacity);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
