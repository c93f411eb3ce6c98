//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Client read / upstream connect / upstream read / client write:
//!     → timeouts.rs (optional deadline per operation)
//!     → on expiry: same handling as an I/O failure on that socket
//! ```
//!
//! # Design Decisions
//! - No retries: the relay is a blind byte pipe and the request is forwarded once
//! - Deadlines are opt-out (zero disables) so the blocking behavior stays reachable

pub mod timeouts;

pub use timeouts::with_deadline;
