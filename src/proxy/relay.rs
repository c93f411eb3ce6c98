//! Blind relay of a request to the upstream.
//!
//! # Responsibilities
//! - Open one outbound connection per proxied request
//! - Forward the original request bytes unmodified
//! - Stream the upstream response back chunk by chunk, unmodified
//! - Synthesize `502 Bad Gateway` when the upstream cannot be used
//!
//! # Flow
//! ```text
//! connect ──fail──▶ 502, UpstreamUnreachable
//!    │
//! send request ──fail──▶ 502, UpstreamSendFailed
//!    │
//! ┌─▶ read chunk ──fail──▶ 502, UpstreamRecvFailed
//! │      │ 0 bytes ──▶ Relayed(total)
//! │      ▼
//! └── write chunk to client ──fail──▶ ClientSendFailed (no 502)
//! ```
//!
//! The upstream stream is owned by `relay` and dropped on every return,
//! which closes the socket.

use std::fmt;
use std::io;
use std::time::Duration;

use http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::http::response::BAD_GATEWAY;
use crate::resilience::with_deadline;

/// Upper bound on a single upstream read.
pub const RELAY_CHUNK_SIZE: usize = 64 * 1024;

/// How a relay attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyOutcome {
    /// Upstream reached end-of-stream; this many bytes went to the client.
    Relayed(u64),
    /// The outbound connection could not be established.
    UpstreamUnreachable,
    /// The request could not be forwarded.
    UpstreamSendFailed,
    /// Reading the response failed after `relayed` bytes were already passed on.
    UpstreamRecvFailed { relayed: u64 },
    /// The client stopped accepting data.
    ClientSendFailed { relayed: u64 },
}

impl ProxyOutcome {
    /// Whether this outcome answers the client with a 502.
    pub fn sends_bad_gateway(&self) -> bool {
        matches!(
            self,
            ProxyOutcome::UpstreamUnreachable
                | ProxyOutcome::UpstreamSendFailed
                | ProxyOutcome::UpstreamRecvFailed { .. }
        )
    }

    /// Bytes of upstream response passed to the client.
    pub fn relayed_bytes(&self) -> u64 {
        match self {
            ProxyOutcome::Relayed(n)
            | ProxyOutcome::UpstreamRecvFailed { relayed: n }
            | ProxyOutcome::ClientSendFailed { relayed: n } => *n,
            ProxyOutcome::UpstreamUnreachable | ProxyOutcome::UpstreamSendFailed => 0,
        }
    }

    /// Status recorded for metrics. Relayed responses are opaque, so they count as 200.
    pub fn status(&self) -> StatusCode {
        if self.sends_bad_gateway() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::OK
        }
    }
}

impl fmt::Display for ProxyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyOutcome::Relayed(n) => write!(f, "relayed {n} bytes"),
            ProxyOutcome::UpstreamUnreachable => f.write_str("upstream unreachable"),
            ProxyOutcome::UpstreamSendFailed => f.write_str("upstream send failed"),
            ProxyOutcome::UpstreamRecvFailed { relayed } => {
                write!(f, "upstream recv failed after {relayed} bytes")
            }
            ProxyOutcome::ClientSendFailed { relayed } => {
                write!(f, "client send failed after {relayed} bytes")
            }
        }
    }
}

/// Relays requests to one fixed upstream.
#[derive(Debug, Clone)]
pub struct Relay {
    upstream: String,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl Relay {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            upstream: upstream.address(),
            connect_timeout: timeouts.connect(),
            read_timeout: timeouts.upstream_read(),
            write_timeout: timeouts.client_write(),
        }
    }

    /// The `host:port` this relay connects to.
    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Forward `request` upstream and copy the response into `client`.
    pub async fn relay<W>(&self, request: &[u8], client: &mut W) -> ProxyOutcome
    where
        W: AsyncWrite + Unpin,
    {
        let mut upstream = match with_deadline(
            self.connect_timeout,
            TcpStream::connect(self.upstream.as_str()),
        )
        .await
        {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(upstream = %self.upstream, error = %e, "Connect to upstream failed");
                self.bad_gateway(client).await;
                return ProxyOutcome::UpstreamUnreachable;
            }
        };

        if let Err(e) = upstream.write_all(request).await {
            tracing::warn!(upstream = %self.upstream, error = %e, "Forwarding request failed");
            self.bad_gateway(client).await;
            return ProxyOutcome::UpstreamSendFailed;
        }

        let mut buf = vec![0u8; RELAY_CHUNK_SIZE];
        let mut relayed = 0u64;
        loop {
            let n = match with_deadline(self.read_timeout, upstream.read(&mut buf)).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(
                        upstream = %self.upstream,
                        relayed,
                        error = %e,
                        "Reading upstream response failed"
                    );
                    self.bad_gateway(client).await;
                    return ProxyOutcome::UpstreamRecvFailed { relayed };
                }
            };

            if let Err(e) = self.send(client, &buf[..n]).await {
                tracing::debug!(relayed, error = %e, "Client went away mid-relay");
                return ProxyOutcome::ClientSendFailed { relayed };
            }
            relayed += n as u64;
        }

        if let Err(e) = with_deadline(self.write_timeout, client.flush()).await {
            tracing::debug!(relayed, error = %e, "Client went away mid-relay");
            return ProxyOutcome::ClientSendFailed { relayed };
        }
        ProxyOutcome::Relayed(relayed)
    }

    async fn send<W>(&self, client: &mut W, bytes: &[u8]) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        with_deadline(self.write_timeout, client.write_all(bytes)).await
    }

    /// Best effort; a client that cannot take the 502 is already gone.
    async fn bad_gateway<W>(&self, client: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        if let Err(e) = self.send(client, BAD_GATEWAY).await {
            tracing::debug!(error = %e, "Could not deliver 502 to client");
        }
    }
}
