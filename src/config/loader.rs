//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, VersioningType};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert!(!config.versioning.to_mode().is_enabled());
    }

    #[test]
    fn test_header_versioning() {
        let config = parse_config(
            r#"
            [versioning]
            type = "header"
            header = "X-Api-Version"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.versioning.kind, VersioningType::Header);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.versioning.to_mode().kind(), "header");
    }

    #[test]
    fn test_uri_versioning_defaults_prefix() {
        let config = parse_config("[versioning]\ntype = \"uri\"\n").unwrap();
        match config.versioning.to_mode() {
            crate::routing::VersioningMode::Uri { prefix } => assert_eq!(prefix, "v"),
            other => panic!("unexpected mode {:?}", other),
        }
    }

    #[test]
    fn test_media_type_maps_to_custom() {
        let config = parse_config("[versioning]\ntype = \"media_type\"\n").unwrap();
        assert_eq!(config.versioning.to_mode().kind(), "custom");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[versioning]\ntype = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors_are_collected() {
        let err = parse_config(
            r#"
            [versioning]
            type = "header"
            header = ""

            [advisories]
            channel_capacity = 0
            "#,
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/versioned-router.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
