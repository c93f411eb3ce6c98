//! Route matching logic.
//!
//! # Design Decisions
//! - Matchers see the decoded file name, never the raw target
//! - Extension matching is exact and case-sensitive
//! - No regex to guarantee O(n) matching

use crate::http::content_type::extension;

/// Trait for matching decoded file names against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the file name matches this condition.
    fn matches(&self, file_name: &str) -> bool;
}

/// Matches names whose extension (from the last `.`) equals a fixed string.
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    extension: String,
}

impl ExtensionMatcher {
    /// Create a new extension matcher. `extension` includes the leading dot.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl Matcher for ExtensionMatcher {
    fn matches(&self, file_name: &str) -> bool {
        extension(file_name) == Some(self.extension.as_str())
    }
}
