//! Extension based content classification.
//!
//! The extension of a name is everything from its last `.` to the end,
//! dot included. Matching is exact and case-sensitive.

use std::fmt;

/// Extension of the segment files owned by the upstream.
pub const PROXY_EXTENSION: &str = ".ts";

/// MIME types this server knows how to label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    OctetStream,
    Html,
    PlainText,
    Jpeg,
}

impl ContentType {
    /// Classify a file name by its extension. Unknown or missing → octet-stream.
    pub fn for_name(name: &str) -> Self {
        match extension(name) {
            Some(".html") => ContentType::Html,
            Some(".txt") => ContentType::PlainText,
            Some(".jpg") => ContentType::Jpeg,
            _ => ContentType::OctetStream,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::OctetStream => "application/octet-stream",
            ContentType::Html => "text/html",
            ContentType::PlainText => "text/plain",
            ContentType::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Substring from the last `.` to the end, or `None` if there is no `.`.
pub fn extension(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[idx..])
}

/// Whether a decoded file name belongs to the upstream rather than local disk.
pub fn is_proxied(name: &str) -> bool {
    extension(name) == Some(PROXY_EXTENSION)
}
