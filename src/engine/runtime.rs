// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;

use super::core::DispatchCore;
use super::executor::PipelineExecutor;
use super::{CoreCommand, RuntimeEvent};

/// Async shell around [`DispatchCore`]: reads events, feeds the core and
/// executes the commands it returns.
pub struct Runtime<E: PipelineExecutor> {
    core: DispatchCore,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: PipelineExecutor> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: PipelineExecutor> Runtime<E> {
    pub fn new(core: DispatchCore, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop. Returns the core so callers can inspect final state.
    pub async fn run(mut self) -> Result<DispatchCore> {
        info!("watching for changes");

        loop {
            let Some(event) = self.event_rx.recv().await else {
                info!("runtime event channel closed; exiting");
                break;
            };

            debug!(?event, "runtime received event");
            let step = self.core.step(event);

            for command in step.commands {
                match command {
                    CoreCommand::RunPipeline { rule, pipeline } => {
                        self.executor.spawn_pipeline(rule, pipeline).await?;
                    }
                    CoreCommand::RequestExit => debug!("core issued RequestExit"),
                }
            }

            if !step.keep_running {
                break;
            }
        }

        info!("runtime exiting");
        Ok(self.core)
    }
}
