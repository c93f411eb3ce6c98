//! Logs and metrics.
//!
//! ```text
//! server / relay / file server
//!     → logging.rs  tracing events, pretty or JSON on stdout
//!     → metrics.rs  request counts, latency, bytes out, open connections
//!                   (Prometheus endpoint only when enabled)
//! ```
//!
//! Every event about a connection carries its `connection_id`.

pub mod logging;
pub mod metrics;
