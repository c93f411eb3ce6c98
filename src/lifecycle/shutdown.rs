//! Stop signal shared by the accept loop and the signal listener.

use tokio::sync::broadcast;

/// One-shot stop request fanned out over a broadcast channel.
///
/// Each long-running task holds its own receiver. Dropping the
/// `Shutdown` closes the channel, which receivers also observe.
#[derive(Debug)]
pub struct Shutdown {
    sender: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Ask every subscriber to stop. Without subscribers this is a no-op.
    pub fn trigger(&self) {
        if self.sender.send(()).is_err() {
            tracing::debug!("Stop requested with nobody listening");
        }
    }

    /// Subscribers that have not been dropped yet.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
