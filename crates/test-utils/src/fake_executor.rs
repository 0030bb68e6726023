use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use assetflow::engine::{PipelineExecutor, PipelineOutcome, RuntimeEvent};
use assetflow::errors::Result;
use assetflow::types::{BoxFuture, TaskName};

/// A fake executor that:
/// - records which `(rule, pipeline)` pairs were dispatched
/// - immediately reports `PipelineFinished` for each, failing the pipelines
///   listed in `failing`.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<(String, TaskName)>>>,
    failing: HashSet<TaskName>,
}

impl FakeExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        executed: Arc<Mutex<Vec<(String, TaskName)>>>,
    ) -> Self {
        Self {
            runtime_tx,
            executed,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, pipeline: &str) -> Self {
        self.failing.insert(pipeline.to_string());
        self
    }
}

impl PipelineExecutor for FakeExecutor {
    fn spawn_pipeline(&mut self, rule: String, pipeline: TaskName) -> BoxFuture<'_, Result<()>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let outcome = if self.failing.contains(&pipeline) {
            PipelineOutcome::Failed(format!("{pipeline} failed"))
        } else {
            PipelineOutcome::Success
        };

        Box::pin(async move {
            {
                let mut guard = executed.lock().unwrap();
                guard.push((rule.clone(), pipeline.clone()));
            }

            tx.send(RuntimeEvent::PipelineFinished {
                rule,
                pipeline,
                outcome,
            })
            .await
            .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
