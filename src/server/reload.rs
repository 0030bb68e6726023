// src/server/reload.rs

use tokio::sync::broadcast;
use tracing::{debug, info};

/// Payload sent to subscribers; carries nothing, the event is the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reload;

/// Fan-out of reload notifications to every open event stream.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<Reload>,
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Reload> {
        self.tx.subscribe()
    }

    /// Broadcast a reload. Not queued for clients that connect later.
    pub fn reload(&self) -> usize {
        match self.tx.send(Reload) {
            Ok(n) => {
                info!(clients = n, "reloading browsers");
                n
            }
            Err(_) => {
                debug!("no browsers connected; reload dropped");
                0
            }
        }
    }
}
