//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection
//!     → server.rs (single read, dispatch)
//!     → request.rs (request line, target, decoded file name)
//!     → [routing decides local vs upstream]
//!     → file_server.rs + content_type.rs + response.rs (local)
//!       or proxy::relay (upstream)
//!     → Connection closed
//! ```

pub mod content_type;
pub mod file_server;
pub mod request;
pub mod response;
pub mod server;

pub use content_type::{is_proxied, ContentType, PROXY_EXTENSION};
pub use file_server::{FileServer, ServeError, ServeOutcome};
pub use request::{InboundRequest, ParseError};
pub use server::HttpServer;
