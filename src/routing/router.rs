//! Route lookup.
//!
//! # Responsibilities
//! - Decide, per request, between local serving and upstream relay
//! - Carry the decoded file name to the local branch
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - The proxy branch carries nothing: it forwards the raw request bytes

use crate::http::content_type::PROXY_EXTENSION;
use crate::http::request::InboundRequest;
use crate::routing::matcher::{ExtensionMatcher, Matcher};

/// Where a request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Serve this decoded file name from local disk.
    Local { file_name: String },
    /// Relay the original request to the upstream.
    Upstream,
}

impl Route {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Local { .. } => "local",
            Route::Upstream => "upstream",
        }
    }
}

/// Routes requests by the extension of their decoded file name.
#[derive(Debug)]
pub struct Router {
    upstream: Box<dyn Matcher>,
}

impl Router {
    pub fn new(upstream: Box<dyn Matcher>) -> Self {
        Self { upstream }
    }

    /// Route a request.
    pub fn route(&self, request: &InboundRequest) -> Route {
        self.route_file_name(request.file_name())
    }

    /// Route an already decoded file name.
    pub fn route_file_name(&self, file_name: String) -> Route {
        if self.upstream.matches(&file_name) {
            Route::Upstream
        } else {
            Route::Local { file_name }
        }
    }
}

impl Default for Router {
    /// `.ts` segments go upstream, everything else is local.
    fn default() -> Self {
        Self::new(Box::new(ExtensionMatcher::new(PROXY_EXTENSION)))
    }
}
