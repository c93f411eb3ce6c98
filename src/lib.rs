//! HTTP/1.0 origin server with a transparent relay for video segments.
//!
//! Requests for `.ts` files are forwarded byte-for-byte to one fixed
//! upstream; everything else is served from local disk.

pub mod config;
pub mod http;
pub mod net;
pub mod proxy;
pub mod routing;

pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use crate::config::ServerConfig;
pub use crate::http::HttpServer;
pub use crate::lifecycle::Shutdown;
