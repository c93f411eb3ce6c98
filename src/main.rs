//! segment-proxy
//!
//! An HTTP/1.0 file server that relays video segments to a fixed upstream.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                 SEGMENT PROXY                 │
//!                        │                                               │
//!   Client Request       │  ┌─────────┐    ┌─────────┐    ┌──────────┐   │
//!   ─────────────────────┼─▶│   net   │───▶│  http   │───▶│ routing  │   │
//!                        │  │listener │    │ server  │    │ (.ts?)   │   │
//!                        │  └─────────┘    └─────────┘    └────┬─────┘   │
//!                        │                         local ┌─────┴────┐    │
//!                        │                               ▼          ▼    │
//!   Client Response      │                      ┌────────────┐ ┌───────┐ │
//!   ◀────────────────────┼──────────────────────│file_server │ │ proxy │◀┼──── Upstream
//!                        │                      └────────────┘ └───────┘ │
//!                        │                                               │
//!                        │  config · lifecycle · observability · timeouts│
//!                        └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use segment_proxy::config::{self, ServerConfig};
use segment_proxy::lifecycle;
use segment_proxy::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "segment-proxy")]
#[command(
    about = "HTTP/1.0 file server that relays .ts segments to an upstream",
    long_about = None
)]
struct Cli {
    /// Local port to listen on
    #[arg(short = 'b', long = "port")]
    port: Option<u16>,

    /// IPv4 address of the upstream video server
    #[arg(short = 'r', long = "remote-host")]
    remote_host: Option<String>,

    /// Port of the upstream video server
    #[arg(short = 'p', long = "remote-port")]
    remote_port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve local files from
    #[arg(long)]
    root: Option<PathBuf>,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    fn resolve_config(&self) -> Result<ServerConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::read_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = &self.remote_host {
            config.upstream.host = host.clone();
        }
        if let Some(port) = self.remote_port {
            config.upstream.port = port;
        }
        if let Some(root) = &self.root {
            config.files.root = root.clone();
        }

        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        port = config.listener.port,
        upstream = %config.upstream.address(),
        root = %config.files.root.display(),
        max_connections = config.listener.max_connections,
        "Configuration loaded"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
