//! Process start and stop.
//!
//! # Data Flow
//! ```text
//! startup.rs:   validated config → metrics endpoint (optional) → bind → serve
//! signals.rs:   SIGINT / SIGTERM → Shutdown::trigger
//! shutdown.rs:  trigger → accept loop exits → in-flight connections drain
//! ```
//!
//! Connections still open when `timeouts.shutdown_grace_secs` runs out are
//! abandoned.

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
