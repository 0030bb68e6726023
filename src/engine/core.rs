// src/engine/core.rs

//! Pure dispatch state machine.
//!
//! Consumes [`RuntimeEvent`]s and returns the commands the IO shell should
//! execute. No channels, no Tokio, no filesystem: everything here is unit
//! tested directly.

use std::collections::BTreeMap;

use tracing::{debug, error, info, warn};

use crate::engine::{PipelineOutcome, RuntimeEvent, RuntimeOptions};
use crate::types::TaskName;
use crate::watch::RuleSet;

/// Command produced by the core, executed by the async shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run `pipeline` on behalf of watch rule `rule`.
    RunPipeline { rule: String, pipeline: TaskName },
    /// Stop the runtime loop.
    RequestExit,
}

/// Result of feeding one event to the core.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub keep_running: bool,
}

impl CoreStep {
    fn run(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn exit() -> Self {
        Self {
            commands: vec![CoreCommand::RequestExit],
            keep_running: false,
        }
    }
}

#[derive(Debug)]
pub struct DispatchCore {
    rules: RuleSet,
    /// Running pipelines per rule. Overlap is allowed, only counted.
    in_flight: BTreeMap<String, usize>,
    failures: usize,
    options: RuntimeOptions,
}

impl DispatchCore {
    pub fn new(rules: RuleSet, options: RuntimeOptions) -> Self {
        Self {
            rules,
            in_flight: BTreeMap::new(),
            failures: 0,
            options,
        }
    }

    pub fn in_flight(&self, rule: &str) -> usize {
        self.in_flight.get(rule).copied().unwrap_or(0)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.values().all(|n| *n == 0)
    }

    /// Pipelines that finished with an error during this session.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::ChangesDetected { paths } => self.on_changes(paths),
            RuntimeEvent::PipelineFinished {
                rule,
                pipeline,
                outcome,
            } => self.on_finished(rule, pipeline, outcome),
            RuntimeEvent::ShutdownRequested => {
                info!("shutdown requested");
                CoreStep::exit()
            }
        }
    }

    fn on_changes(&mut self, paths: Vec<String>) -> CoreStep {
        let matched: Vec<(String, TaskName)> = self
            .rules
            .matching(&paths)
            .into_iter()
            .map(|p| (p.name().to_string(), p.pipeline().to_string()))
            .collect();

        if matched.is_empty() {
            debug!(?paths, "change batch matched no rule");
            return self.idle_check();
        }

        let mut commands = Vec::with_capacity(matched.len());
        for (rule, pipeline) in matched {
            let running = self.in_flight.entry(rule.clone()).or_insert(0);
            if *running > 0 {
                warn!(
                    rule = %rule,
                    running = *running,
                    "rule triggered while a previous run is still in flight; runs will overlap"
                );
            }
            *running += 1;
            info!(rule = %rule, pipeline = %pipeline, "change detected");
            commands.push(CoreCommand::RunPipeline { rule, pipeline });
        }

        CoreStep::run(commands)
    }

    fn on_finished(&mut self, rule: String, pipeline: TaskName, outcome: PipelineOutcome) -> CoreStep {
        if let Some(running) = self.in_flight.get_mut(&rule) {
            *running = running.saturating_sub(1);
        }

        match outcome {
            PipelineOutcome::Success => {
                debug!(rule = %rule, pipeline = %pipeline, "pipeline finished");
            }
            PipelineOutcome::Failed(message) => {
                self.failures += 1;
                error!(
                    rule = %rule,
                    pipeline = %pipeline,
                    error = %message,
                    "pipeline failed; still watching"
                );
            }
        }

        self.idle_check()
    }

    fn idle_check(&self) -> CoreStep {
        if self.options.exit_when_idle && self.is_idle() {
            CoreStep::exit()
        } else {
            CoreStep::run(Vec::new())
        }
    }
}
