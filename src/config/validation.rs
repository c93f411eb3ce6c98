//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, connection limits)
//! - Check that the document root is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream host {0:?} is not an IPv4 address")]
    UpstreamHost(String),

    #[error("upstream port must be non-zero")]
    UpstreamPort,

    #[error("max_connections must be at least 1")]
    MaxConnections,

    #[error("document root {0:?} is not a directory")]
    DocumentRoot(String),

    #[error("unknown log level {0:?}")]
    LogLevel(String),

    #[error("metrics address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.host.parse::<Ipv4Addr>().is_err() {
        errors.push(ValidationError::UpstreamHost(config.upstream.host.clone()));
    }
    if config.upstream.port == 0 {
        errors.push(ValidationError::UpstreamPort);
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    }
    if !config.files.root.is_dir() {
        errors.push(ValidationError::DocumentRoot(
            config.files.root.display().to_string(),
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
