// src/engine/dispatcher.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use crate::config::ConfigFile;
use crate::engine::core::DispatchCore;
use crate::engine::executor::RegistryExecutor;
use crate::engine::runtime::Runtime;
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::errors::Result;
use crate::tasks::TaskRegistry;
use crate::tasks::standard::names;
use crate::watch::{RuleSet, spawn_watcher};

/// Runs the long-lived `serve` session and the one-shot `deploy`.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<TaskRegistry>,
    rules: RuleSet,
    root: PathBuf,
    debounce: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<TaskRegistry>, rules: RuleSet, root: impl Into<PathBuf>, debounce: Duration) -> Self {
        Self {
            registry,
            rules,
            root: root.into(),
            debounce,
        }
    }

    pub fn from_config(cfg: &ConfigFile, registry: Arc<TaskRegistry>) -> Result<Self> {
        Ok(Self::new(
            registry,
            RuleSet::from_config(cfg)?,
            cfg.root(),
            Duration::from_millis(cfg.watch.debounce_ms),
        ))
    }

    /// Full build, asset build, then the server. Any failure here is fatal.
    pub async fn startup(&self) -> Result<()> {
        self.registry.run(names::SERVE_STARTUP).await
    }

    /// Startup, then react to changes until Ctrl-C.
    pub async fn serve(self) -> Result<()> {
        self.startup().await?;

        let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

        let _watcher = spawn_watcher(&self.root, self.debounce, rt_tx.clone())?;

        {
            let tx = rt_tx.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    eprintln!("failed to listen for Ctrl+C: {e}");
                    return;
                }
                let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
            });
        }

        let core = DispatchCore::new(self.rules, RuntimeOptions::default());
        let executor = RegistryExecutor::new(Arc::clone(&self.registry), rt_tx);
        let core = Runtime::new(core, rt_rx, executor).run().await?;

        info!(failed_pipelines = core.failures(), "serve session ended");
        Ok(())
    }

    /// Production site build followed by the asset build. Never starts the
    /// server.
    pub async fn deploy(&self) -> Result<()> {
        self.registry.run(names::DEPLOY).await
    }
}
