//! Accept loop and per-connection dispatch.
//!
//! # Responsibilities
//! - Accept connections and spawn one task per connection
//! - Read exactly one request per connection
//! - Dispatch to the local file server or the upstream relay
//! - Close every connection after its single response
//! - Stop accepting on shutdown and drain in-flight connections
//!
//! # Design Decisions
//! - No shared mutable state between connections; `AppState` is read-only
//! - Malformed requests are dropped without a response
//! - Accept errors are logged and never end the loop

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

use crate::config::ServerConfig;
use crate::http::file_server::{FileServer, ServeOutcome};
use crate::http::request::InboundRequest;
use crate::net::{Accepted, ConnectionGuard, ConnectionState, ConnectionTracker, Listener};
use crate::observability::metrics;
use crate::proxy::Relay;
use crate::resilience::with_deadline;
use crate::routing::{Route, Router};

/// Capacity of the single read that must contain the request line.
pub const REQUEST_BUFFER_SIZE: usize = 8 * 1024;

/// Read-only state shared by every connection task.
#[derive(Debug)]
pub struct AppState {
    pub router: Router,
    pub files: FileServer,
    pub relay: Relay,
    pub client_read_timeout: Option<Duration>,
    pub client_write_timeout: Option<Duration>,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            router: Router::default(),
            files: FileServer::new(&config.files, &config.timeouts),
            relay: Relay::new(&config.upstream, &config.timeouts),
            client_read_timeout: config.timeouts.client_read(),
            client_write_timeout: config.timeouts.client_write(),
        }
    }
}

/// HTTP/1.0 origin server with a segment relay.
pub struct HttpServer {
    state: Arc<AppState>,
    config: ServerConfig,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::from_config(&config)),
            config,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Run the server until `shutdown` fires, then drain open connections.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.relay.upstream(),
            "HTTP server starting"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(Accepted { stream, peer, slot }) => {
                        let guard = self.tracker.track();
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            let _slot = slot;
                            handle_connection(&state, stream, peer, guard).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Accept failed, continuing");
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }
        drop(listener);

        let remaining = self.tracker.drain(self.config.timeouts.shutdown_grace()).await;
        if remaining > 0 {
            tracing::warn!(remaining, "Grace period elapsed with connections still open");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Handle one accepted connection from first read to close.
pub async fn handle_connection<S>(
    state: &AppState,
    mut stream: S,
    peer: SocketAddr,
    mut guard: ConnectionGuard,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start = Instant::now();
    let connection_id = guard.id();

    let mut buf = vec![0u8; REQUEST_BUFFER_SIZE];
    let n = match with_deadline(state.client_read_timeout, stream.read(&mut buf)).await {
        Ok(0) => {
            tracing::debug!(connection_id = %connection_id, peer = %peer, "Closed before request");
            return;
        }
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection_id,
                peer = %peer,
                error = %e,
                "Request read failed"
            );
            return;
        }
    };
    buf.truncate(n);

    let request = match InboundRequest::parse(buf) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection_id,
                peer = %peer,
                error = %e,
                "Dropping malformed request"
            );
            return;
        }
    };
    guard.transition(ConnectionState::Parsed);

    let route = state.router.route(&request);
    let label = route.label();
    tracing::debug!(
        connection_id = %connection_id,
        target = %request.target(),
        route = label,
        "Request routed"
    );

    match route {
        Route::Local { file_name } => {
            guard.transition(ConnectionState::Serving);
            match state.files.serve(&mut stream, &file_name).await {
                Ok(outcome) => {
                    let status = outcome.status();
                    tracing::info!(
                        connection_id = %connection_id,
                        peer = %peer,
                        file = %file_name,
                        status = status.as_u16(),
                        "Served from local filesystem"
                    );
                    if let ServeOutcome::Served { bytes, .. } = outcome {
                        metrics::record_bytes_sent(label, bytes);
                    }
                    metrics::record_request(label, status.as_u16(), start);
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        file = %file_name,
                        error = %e,
                        "Local response aborted"
                    );
                }
            }
        }
        Route::Upstream => {
            guard.transition(ConnectionState::Proxying);
            let outcome = state.relay.relay(request.raw_bytes(), &mut stream).await;
            tracing::info!(
                connection_id = %connection_id,
                peer = %peer,
                target = %request.target(),
                outcome = %outcome,
                "Proxied to upstream"
            );
            metrics::record_bytes_sent(label, outcome.relayed_bytes());
            metrics::record_request(label, outcome.status().as_u16(), start);
        }
    }

    if let Err(e) = with_deadline(state.client_write_timeout, stream.shutdown()).await {
        tracing::trace!(
            connection_id = %connection_id,
            error = %e,
            "Shutdown of client stream failed"
        );
    }
    guard.transition(ConnectionState::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileConfig, TimeoutConfig, UpstreamConfig};
    use crate::http::response::{BAD_GATEWAY, NOT_FOUND};
    use tokio::io::duplex;
    use tokio::net::TcpListener;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn state_for(root: &std::path::Path) -> AppState {
        let mut config = ServerConfig {
            files: FileConfig {
                root: root.to_path_buf(),
                confine_to_root: false,
            },
            timeouts: TimeoutConfig::default(),
            ..ServerConfig::default()
        };
        // Closed port: bind and release.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        config.upstream = UpstreamConfig {
            host: "127.0.0.1".into(),
            port: listener.local_addr().unwrap().port(),
        };
        drop(listener);
        AppState::from_config(&config)
    }

    /// Send `request` through `handle_connection` and collect everything written back.
    async fn exchange(state: &AppState, request: &[u8]) -> (Vec<u8>, ConnectionTracker) {
        let tracker = ConnectionTracker::new();
        let (mut client, server) = duplex(1 << 20);
        client.write_all(request).await.unwrap();

        handle_connection(state, server, peer(), tracker.track()).await;

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        (response, tracker)
    }

    #[tokio::test]
    async fn root_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        let state = state_for(dir.path()).await;

        let (response, tracker) = exchange(&state, b"GET / HTTP/1.0\r\n\r\n").await;

        let text = String::from_utf8(response).unwrap();
        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html; charset=UTF-8\r\n"));
        assert!(text.ends_with("\r\n\r\n<h1>home</h1>"));
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn encoded_names_are_decoded_for_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("50% off.txt"), "deal").unwrap();
        let state = state_for(dir.path()).await;

        let (response, _) = exchange(&state, b"GET /50%25%20off.txt HTTP/1.0\r\n\r\n").await;
        assert!(response.ends_with(b"Content-Length: 4\r\n\r\ndeal"));
    }

    #[tokio::test]
    async fn missing_file_gets_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path()).await;

        let (response, _) = exchange(&state, b"GET /missing.jpg HTTP/1.0\r\n\r\n").await;
        assert_eq!(response, NOT_FOUND);
    }

    #[tokio::test]
    async fn segments_with_dead_upstream_get_502() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("seg.ts"), "local copy must not be served").unwrap();
        let state = state_for(dir.path()).await;

        let (response, tracker) = exchange(&state, b"GET /seg.ts HTTP/1.0\r\n\r\n").await;
        assert_eq!(response, BAD_GATEWAY);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn malformed_request_is_dropped_silently() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path()).await;

        for raw in [
            &b"GET /index.html"[..],
            &b"DELETE /x HTTP/1.0\r\n\r\n"[..],
            &b"\r\n"[..],
        ] {
            let (response, tracker) = exchange(&state, raw).await;
            assert!(response.is_empty());
            assert_eq!(tracker.active_count(), 0);
        }
    }

    #[tokio::test]
    async fn empty_read_closes_without_response() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path()).await;
        let tracker = ConnectionTracker::new();

        let (mut client, server) = duplex(1024);
        client.shutdown().await.unwrap();
        handle_connection(&state, server, peer(), tracker.track()).await;

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
        assert_eq!(tracker.active_count(), 0);
    }
}
