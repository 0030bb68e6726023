// src/server/mod.rs

//! Local development server.
//!
//! Serves the generated site directory over plain HTTP/1.1 and pushes
//! `reload` events to connected browsers over Server-Sent Events. Every HTML
//! response gets a tiny script injected that listens on
//! [`http::RELOAD_ENDPOINT`] and refreshes the page.

pub mod http;
pub mod mime;
pub mod reload;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::types::BoxFuture;

pub use reload::ReloadHub;

/// Starts the server. Starting an already running server is a no-op that
/// returns the existing address.
pub trait ServerControl: Send + Sync {
    fn start(&self) -> BoxFuture<'_, Result<SocketAddr>>;
}

/// Tells connected browsers to refresh.
pub trait ReloadSignal: Send + Sync {
    /// Returns how many clients were notified. Zero when the server is not
    /// running or nobody is connected; the signal is dropped in that case.
    fn reload(&self) -> usize;
}

#[derive(Debug)]
pub struct DevServer {
    root: PathBuf,
    bind_addr: String,
    hub: ReloadHub,
    bound: Mutex<Option<SocketAddr>>,
}

impl DevServer {
    pub fn new(root: impl Into<PathBuf>, bind_addr: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bind_addr: bind_addr.into(),
            hub: ReloadHub::new(),
            bound: Mutex::new(None),
        }
    }

    /// Serves `paths.build` on `[server].host:[server].port`.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let root = cfg.paths.resolve("build")?;
        let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
        Ok(Self::new(root, addr))
    }

    /// Address the listener is bound to, once started.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.bound.lock().await
    }

    async fn start_inner(&self) -> Result<SocketAddr> {
        let mut bound = self.bound.lock().await;
        if let Some(addr) = *bound {
            debug!(%addr, "dev server already running");
            return Ok(addr);
        }

        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .with_context(|| format!("binding dev server to {}", self.bind_addr))?;
        let addr = listener.local_addr()?;
        *bound = Some(addr);

        info!(root = ?self.root, "serving site at http://{}/", addr);

        let root = self.root.clone();
        let hub = self.hub.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        let root = root.clone();
                        let hub = hub.clone();
                        tokio::spawn(async move {
                            if let Err(e) = http::handle_connection(stream, &root, &hub).await {
                                debug!(%peer, error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                    }
                }
            }
        });

        Ok(addr)
    }
}

impl ServerControl for DevServer {
    fn start(&self) -> BoxFuture<'_, Result<SocketAddr>> {
        Box::pin(self.start_inner())
    }
}

impl ReloadSignal for DevServer {
    fn reload(&self) -> usize {
        self.hub.reload()
    }
}
