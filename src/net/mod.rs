//! Sockets and per-connection bookkeeping.
//!
//! # Data Flow
//! ```text
//! Client connects
//!     → listener.rs (slot from the connection limit, accept)
//!     → connection.rs (id, state, in-flight count)
//!     → http::server handles the one request
//!
//! Connection States:
//!     AwaitRequest → Parsed → Serving | Proxying → Closed
//! ```
//!
//! # Design Decisions
//! - Accept stops taking clients while every slot is in use
//! - Shutdown waits on the in-flight count, not on the tasks themselves
//! - One request per connection; no keep-alive

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionState, ConnectionTracker};
pub use listener::{Accepted, ConnectionSlot, Listener, ListenerError};
