//! Bounded TCP accept.
//!
//! Every accepted socket carries a slot from a semaphore sized by
//! `listener.max_connections`; once all slots are out, `accept` waits
//! before taking the next connection off the backlog.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ListenerConfig;

#[derive(Debug, Error)]
pub enum ListenerError {
    /// The port could not be claimed. Fatal at startup.
    #[error("cannot listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
    /// A single accept failed. The accept loop logs it and keeps going.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),
}

/// A freshly accepted client socket and the slot it occupies.
#[derive(Debug)]
pub struct Accepted {
    pub stream: TcpStream,
    pub peer: SocketAddr,
    pub slot: ConnectionSlot,
}

#[derive(Debug)]
pub struct Listener {
    socket: TcpListener,
    slots: Arc<Semaphore>,
    max_connections: usize,
}

impl Listener {
    /// Bind `bind_host:port` from the listener settings.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let address = config.bind_address();
        match TcpListener::bind(address.as_str()).await {
            Ok(socket) => Ok(Self::from_tcp(socket, config.max_connections)),
            Err(source) => Err(ListenerError::Bind { address, source }),
        }
    }

    /// Take over a socket that is already bound, e.g. on an ephemeral port.
    pub fn from_tcp(socket: TcpListener, max_connections: usize) -> Self {
        match socket.local_addr() {
            Ok(address) => tracing::info!(%address, max_connections, "Accepting connections"),
            Err(e) => tracing::warn!(error = %e, "Bound socket has no local address"),
        }

        Self {
            socket,
            slots: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        }
    }

    /// Wait for a free slot, then for the next client.
    pub async fn accept(&self) -> Result<Accepted, ListenerError> {
        // The semaphore is owned here and never closed.
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| ListenerError::Accept(io::Error::other("connection slots closed")))?;

        let (stream, peer) = self.socket.accept().await.map_err(ListenerError::Accept)?;
        tracing::debug!(
            %peer,
            free_slots = self.slots.available_permits(),
            "Client connected"
        );

        Ok(Accepted {
            stream,
            peer,
            slot: ConnectionSlot { _permit: permit },
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn available_permits(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// Held by a connection task for as long as its socket is open.
///
/// Dropping it, including during a panic unwind, frees the slot.
#[derive(Debug)]
pub struct ConnectionSlot {
    _permit: OwnedSemaphorePermit,
}
