//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → file name (root defaulting + decoding)
//!     → matcher.rs (extension check on the decoded name)
//!     → router.rs: Route::Local { file_name } or Route::Upstream
//! ```
//!
//! # Design Decisions
//! - Deterministic: same input always matches same route
//! - Routing never looks at headers

pub mod matcher;
pub mod router;

pub use router::{Route, Router};
