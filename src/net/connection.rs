//! Connection state machine and lifecycle tracking.
//!
//! # Responsibilities
//! - Track connection state (AwaitRequest → Parsed → Serving|Proxying → Closed)
//! - Generate unique connection IDs for tracing
//! - Count in-flight connections so shutdown can drain them

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::observability::metrics;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Per-connection state. Exactly one request is handled per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for the single request read.
    AwaitRequest,
    /// Request line parsed, route not yet taken.
    Parsed,
    /// Writing a local file response.
    Serving,
    /// Relaying to the upstream.
    Proxying,
    /// Socket closed.
    Closed,
}

impl ConnectionState {
    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (AwaitRequest, Parsed)
                | (Parsed, Serving)
                | (Parsed, Proxying)
                | (AwaitRequest | Parsed | Serving | Proxying, Closed)
        )
    }
}

/// Counts in-flight connections so shutdown can wait for them.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    active: AtomicU64,
    idle: Notify,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a newly accepted connection until the returned guard drops.
    pub fn track(&self) -> ConnectionGuard {
        let active = self.inner.active.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_active_connections(active);
        ConnectionGuard {
            tracker: Arc::clone(&self.inner),
            id: ConnectionId::new(),
            state: ConnectionState::AwaitRequest,
        }
    }

    pub fn active_count(&self) -> u64 {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Wait until every guard is dropped or `grace` elapses.
    ///
    /// Returns the number of connections still open.
    pub async fn drain(&self, grace: Duration) -> u64 {
        let deadline = tokio::time::Instant::now() + grace;
        loop {
            // Register before checking the count so a drop in between is not missed.
            let idle = self.inner.idle.notified();
            if self.active_count() == 0 {
                return 0;
            }
            if tokio::time::timeout_at(deadline, idle).await.is_err() {
                return self.active_count();
            }
        }
    }
}

/// One tracked connection: its id, its state, and its slot in the count.
#[derive(Debug)]
pub struct ConnectionGuard {
    tracker: Arc<TrackerInner>,
    id: ConnectionId,
    state: ConnectionState,
}

impl ConnectionGuard {
    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Move to `next`, ignoring illegal transitions.
    pub fn transition(&mut self, next: ConnectionState) {
        if self.state.can_transition_to(next) {
            tracing::trace!(
                connection_id = %self.id,
                from = ?self.state,
                to = ?next,
                "State change"
            );
            self.state = next;
        } else {
            tracing::warn!(
                connection_id = %self.id,
                from = ?self.state,
                to = ?next,
                "Illegal state change ignored"
            );
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.state != ConnectionState::Closed {
            self.transition(ConnectionState::Closed);
        }
        let remaining = self.tracker.active.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_active_connections(remaining);
        if remaining == 0 {
            self.tracker.idle.notify_waiters();
        }
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
