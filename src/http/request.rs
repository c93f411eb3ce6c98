//! Request line parsing and target resolution.
//!
//! # Responsibilities
//! - Split the request line into method, target, and version tokens
//! - Reject anything but a single-line `GET` request
//! - Resolve the target into a local file name (root defaulting, decoding)
//!
//! # Design Decisions
//! - Only the first line is inspected; headers and body are ignored
//! - The raw bytes are kept untouched so the proxy path can forward them verbatim
//! - Decoding recognizes exactly `%20` and `%25`, nothing else

use bytes::Bytes;
use http::Method;
use thiserror::Error;

/// File served when the target is empty or the root marker.
pub const ROOT_DOCUMENT: &str = "index.html";

/// Why a request line could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("request is empty")]
    Empty,

    #[error("request line is not valid UTF-8")]
    NotUtf8,

    #[error("no request target after method")]
    MissingTarget,

    #[error("unsupported method {0:?}")]
    UnsupportedMethod(String),

    #[error("request target is not terminated by a space")]
    UnterminatedTarget,

    #[error("invalid protocol version {0:?}")]
    InvalidVersion(String),
}

/// One inbound request, as read from a freshly accepted connection.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    raw: Bytes,
    target: String,
}

impl InboundRequest {
    /// Parse the request line out of `raw`.
    pub fn parse(raw: impl Into<Bytes>) -> Result<Self, ParseError> {
        let raw = raw.into();
        let target = parse_target(&raw)?.to_string();
        Ok(Self { raw, target })
    }

    /// The bytes exactly as received from the client.
    pub fn raw_bytes(&self) -> &Bytes {
        &self.raw
    }

    /// The still-encoded request target, including its leading `/`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The local file name this request refers to.
    pub fn file_name(&self) -> String {
        resolve_file_name(&self.target)
    }
}

/// Extract the request target from the first line of `raw`.
fn parse_target(raw: &[u8]) -> Result<&str, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let line_end = raw.iter().position(|&b| b == b'\n').unwrap_or(raw.len());
    let line = raw[..line_end].strip_suffix(b"\r").unwrap_or(&raw[..line_end]);
    let line = std::str::from_utf8(line).map_err(|_| ParseError::NotUtf8)?;

    let (method, rest) = line.split_once(' ').ok_or(ParseError::MissingTarget)?;
    if method != Method::GET.as_str() {
        return Err(ParseError::UnsupportedMethod(method.to_string()));
    }

    let (target, version) = rest
        .split_once(' ')
        .ok_or(ParseError::UnterminatedTarget)?;
    if !version.starts_with("HTTP/") {
        return Err(ParseError::InvalidVersion(version.to_string()));
    }

    Ok(target)
}

/// Map a request target to a file name relative to the document root.
///
/// An empty target or `/` resolves to [`ROOT_DOCUMENT`] and is not decoded.
pub fn resolve_file_name(target: &str) -> String {
    let path = target.strip_prefix('/').unwrap_or(target);
    if path.is_empty() {
        ROOT_DOCUMENT.to_string()
    } else {
        percent_decode(path)
    }
}

/// Decode `%20` to a space and `%25` to `%` in a single left-to-right pass.
///
/// Decoded output is never rescanned, so `%2520` becomes `%20`.
pub fn percent_decode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("%20") {
            out.push(' ');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("%25") {
            out.push('%');
            rest = after;
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_defaults_to_index() {
        assert_eq!(resolve_file_name("/"), "index.html");
        assert_eq!(resolve_file_name(""), "index.html");
    }

    #[test]
    fn root_defaulting_skips_decoding() {
        let request = InboundRequest::parse(Bytes::from_static(b"GET / HTTP/1.0\r\n\r\n")).unwrap();
        assert_eq!(request.target(), "/");
        assert_eq!(request.file_name(), ROOT_DOCUMENT);
    }

    #[test]
    fn decodes_both_escapes() {
        assert_eq!(percent_decode("a%20b%25c"), "a b%c");
        assert_eq!(resolve_file_name("/a%20b%25c"), "a b%c");
    }

    #[test]
    fn decoding_is_identity_without_escapes() {
        for input in ["plain.txt", "dir/file.html", "100%", "%2", "%41%7e", "x%2"] {
            assert_eq!(percent_decode(input), input);
        }
    }

    #[test]
    fn decoding_is_single_pass() {
        assert_eq!(percent_decode("%2520"), "%20");
        assert_eq!(percent_decode("%20%20"), "  ");
        assert_eq!(percent_decode("%%20"), "% ");
        assert_eq!(percent_decode("end%"), "end%");
    }

    #[test]
    fn parses_target_and_keeps_raw_bytes() {
        let raw = b"GET /video%20one.ts HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let request = InboundRequest::parse(Bytes::from_static(raw)).unwrap();

        assert_eq!(request.target(), "/video%20one.ts");
        assert_eq!(request.file_name(), "video one.ts");
        assert_eq!(request.raw_bytes().as_ref(), &raw[..]);
    }

    #[test]
    fn accepts_bare_newline_terminator() {
        let request = InboundRequest::parse(Bytes::from_static(b"GET /a.txt HTTP/1.0\n")).unwrap();
        assert_eq!(request.file_name(), "a.txt");
    }

    #[test]
    fn rejects_malformed_request_lines() {
        let cases: [(&[u8], ParseError); 5] = [
            (b"", ParseError::Empty),
            (b"GET", ParseError::MissingTarget),
            (b"GET /index.html", ParseError::UnterminatedTarget),
            (b"GET /index.html\r\nHost: x y\r\n", ParseError::UnterminatedTarget),
            (b"GET /a.txt SPDY/3\r\n", ParseError::InvalidVersion("SPDY/3".into())),
        ];

        for (raw, expected) in cases {
            assert_eq!(InboundRequest::parse(raw.to_vec()).unwrap_err(), expected);
        }
    }

    #[test]
    fn rejects_other_methods() {
        let err = InboundRequest::parse(Bytes::from_static(b"POST /upload HTTP/1.0\r\n\r\n"))
            .unwrap_err();
        assert_eq!(err, ParseError::UnsupportedMethod("POST".into()));
    }

    #[test]
    fn rejects_non_utf8_request_line() {
        let err =
            InboundRequest::parse(Bytes::from_static(b"GET /\xff\xfe HTTP/1.0\r\n")).unwrap_err();
        assert_eq!(err, ParseError::NotUtf8);
    }
}
