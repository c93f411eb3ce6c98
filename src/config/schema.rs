//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default port the server listens on.
pub const DEFAULT_LISTEN_PORT: u16 = 8081;

/// Default upstream (video segment backend) address.
pub const DEFAULT_UPSTREAM_HOST: &str = "131.179.176.34";

/// Default upstream port.
pub const DEFAULT_UPSTREAM_PORT: u16 = 5001;

/// Root configuration for the server.
///
/// Immutable once loaded and shared read-only by every connection task.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (port, bind host, backpressure).
    pub listener: ListenerConfig,

    /// Upstream that owns proxied segment files.
    pub upstream: UpstreamConfig,

    /// Local file serving settings.
    pub files: FileConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Port to bind and accept on.
    pub port: u16,

    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl ListenerConfig {
    /// The `host:port` string handed to the socket layer.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_LISTEN_PORT,
            bind_host: "0.0.0.0".to_string(),
            max_connections: 1024,
        }
    }
}

/// Upstream backend configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// IPv4 address of the backend.
    pub host: String,

    /// TCP port of the backend.
    pub port: u16,
}

impl UpstreamConfig {
    /// The `host:port` string used to connect.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_UPSTREAM_HOST.to_string(),
            port: DEFAULT_UPSTREAM_PORT,
        }
    }
}

/// Local file serving configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Directory request paths are resolved against.
    pub root: PathBuf,

    /// Refuse paths that escape `root` after canonicalization.
    pub confine_to_root: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            confine_to_root: false,
        }
    }
}

/// Deadlines for blocking I/O. A value of zero disables the deadline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed for the client to deliver its request.
    pub client_read_secs: u64,

    /// Upstream connection establishment timeout.
    pub connect_secs: u64,

    /// Maximum silence between upstream reads.
    pub upstream_read_secs: u64,

    /// Maximum time a single write to the client may block.
    pub client_write_secs: u64,

    /// How long shutdown waits for in-flight connections.
    pub shutdown_grace_secs: u64,
}

impl TimeoutConfig {
    pub fn client_read(&self) -> Option<Duration> {
        non_zero_secs(self.client_read_secs)
    }

    pub fn connect(&self) -> Option<Duration> {
        non_zero_secs(self.connect_secs)
    }

    pub fn upstream_read(&self) -> Option<Duration> {
        non_zero_secs(self.upstream_read_secs)
    }

    pub fn client_write(&self) -> Option<Duration> {
        non_zero_secs(self.client_write_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// All deadlines disabled, as in the original blocking design.
    pub fn unbounded() -> Self {
        Self {
            client_read_secs: 0,
            connect_secs: 0,
            upstream_read_secs: 0,
            client_write_secs: 0,
            shutdown_grace_secs: 0,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_read_secs: 30,
            connect_secs: 5,
            upstream_read_secs: 60,
            client_write_secs: 60,
            shutdown_grace_secs: 10,
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
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
