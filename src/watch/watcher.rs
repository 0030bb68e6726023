// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::engine::RuntimeEvent;
use crate::watch::debounce::ChangeBatcher;
use crate::watch::path_utils::relative_str;

/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and send one `RuntimeEvent::ChangesDetected`
/// per debounced batch of root-relative paths.
///
/// Rule matching happens in the engine; this only observes and batches.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    debounce: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    // notify calls back on its own thread; hop into async through a channel.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("assetflow: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("assetflow: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        let mut batcher = ChangeBatcher::new(debounce);

        loop {
            let deadline = batcher.deadline();
            let wake = tokio::time::Instant::from_std(deadline.unwrap_or_else(Instant::now));

            tokio::select! {
                maybe = event_rx.recv() => {
                    let Some(event) = maybe else { break };
                    if event.kind.is_access() {
                        continue;
                    }
                    trace!(?event, "notify event");
                    let now = Instant::now();
                    for path in &event.paths {
                        if let Some(rel) = relative_str(&root, path) {
                            batcher.add(rel, now);
                        }
                    }
                }
                _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    let paths = batcher.take();
                    debug!(count = paths.len(), ?paths, "change batch ready");
                    if runtime_tx
                        .send(RuntimeEvent::ChangesDetected { paths })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
