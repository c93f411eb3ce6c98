//! Response framing.
//!
//! # Responsibilities
//! - Encode HTTP/1.0 status lines and headers for local responses
//! - Provide the fixed 404 and 502 responses
//!
//! # Design Decisions
//! - Heads are encoded separately from bodies so bodies can be streamed
//! - Proxied responses never pass through here; they are relayed untouched

use http::StatusCode;

use crate::http::content_type::ContentType;

/// Body of the 404 response.
pub const NOT_FOUND_BODY: &str = "Requested file does not exist.";

/// Complete 404 response, body included.
pub const NOT_FOUND: &[u8] = b"HTTP/1.0 404 Not Found\r\n\
Content-Type: text/plain; charset=UTF-8\r\n\
Content-Length: 30\r\n\
\r\n\
Requested file does not exist.";

/// Complete 502 response, sent when the upstream cannot be used.
pub const BAD_GATEWAY: &[u8] = b"HTTP/1.0 502 Bad Gateway\r\n\r\n";

/// Status line plus entity headers of a local response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub content_type: ContentType,
    pub content_length: u64,
}

impl ResponseHead {
    /// Head of a successful file response.
    pub fn ok(content_type: ContentType, content_length: u64) -> Self {
        Self {
            status: StatusCode::OK,
            content_type,
            content_length,
        }
    }

    /// Encode the head, including the blank line that ends it.
    pub fn encode(&self) -> Vec<u8> {
        format!(
            "HTTP/1.0 {} {}\r\nContent-Type: {}; charset=UTF-8\r\nContent-Length: {}\r\n\r\n",
            self.status.as_str(),
            self.status.canonical_reason().unwrap_or(""),
            self.content_type,
            self.content_length,
        )
        .into_bytes()
    }
}
