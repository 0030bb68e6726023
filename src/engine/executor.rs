// src/engine/executor.rs

//! Pluggable pipeline execution.
//!
//! The runtime talks to a `PipelineExecutor` rather than the registry
//! directly, so tests can swap in a fake that records dispatches and
//! answers with synthetic completions.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::{PipelineOutcome, RuntimeEvent};
use crate::errors::Result;
use crate::tasks::TaskRegistry;
use crate::types::{BoxFuture, TaskName};

pub trait PipelineExecutor: Send {
    /// Start `pipeline` for `rule`. Must not wait for it to finish; the
    /// outcome is reported as `RuntimeEvent::PipelineFinished`.
    fn spawn_pipeline(&mut self, rule: String, pipeline: TaskName) -> BoxFuture<'_, Result<()>>;
}

/// Production executor: each pipeline is a spawned registry run.
#[derive(Debug)]
pub struct RegistryExecutor {
    registry: Arc<TaskRegistry>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RegistryExecutor {
    pub fn new(registry: Arc<TaskRegistry>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            registry,
            runtime_tx,
        }
    }
}

impl PipelineExecutor for RegistryExecutor {
    fn spawn_pipeline(&mut self, rule: String, pipeline: TaskName) -> BoxFuture<'_, Result<()>> {
        let run = self.registry.run(&pipeline);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = match run.await {
                    Ok(()) => PipelineOutcome::Success,
                    Err(e) => PipelineOutcome::Failed(e.to_string()),
                };
                let event = RuntimeEvent::PipelineFinished {
                    rule,
                    pipeline,
                    outcome,
                };
                if tx.send(event).await.is_err() {
                    debug!("runtime gone before pipeline completion was reported");
                }
            });
            Ok(())
        })
    }
}
