//! Upstream proxy subsystem.
//!
//! # Data Flow
//! ```text
//! raw request bytes (undecoded, exactly as received)
//!     → relay.rs (connect, forward, stream back)
//!     → client socket
//! ```
//!
//! # Design Decisions
//! - No pooling: one fresh upstream connection per proxied request
//! - No reframing: status line, headers, and body pass through untouched
//! - Failures are outcomes, not errors; the relay decides the client's 502

pub mod relay;

pub use relay::{ProxyOutcome, Relay, RELAY_CHUNK_SIZE};
