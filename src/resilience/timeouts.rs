//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap client and upstream I/O with optional deadlines
//! - Cancel operations cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A missing deadline means "wait forever", matching plain blocking I/O
//! - Expiry surfaces as `io::ErrorKind::TimedOut` so callers handle it
//!   exactly like any other I/O failure on that socket

use std::future::Future;
use std::io;
use std::time::Duration;

/// Run `fut` to completion, failing with `TimedOut` if `limit` elapses first.
pub async fn with_deadline<F, T>(limit: Option<Duration>, fut: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("operation timed out after {limit:?}"),
            )),
        },
        None => fut.await,
    }
}
