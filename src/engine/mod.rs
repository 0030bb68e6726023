// src/engine/mod.rs

//! Change-driven rebuild dispatcher.
//!
//! The pure state machine lives in [`core`]: it turns change batches into
//! pipeline runs and tracks what is in flight. [`runtime`] is the async shell
//! that feeds it events and hands pipelines to a [`PipelineExecutor`].
//! [`dispatcher`] wires startup, watching and shutdown for `serve`.

use crate::types::TaskName;

/// How a pipeline run ended, as reported back to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success,
    Failed(String),
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit once nothing is in flight (used by tests that feed a fixed set
    /// of events).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, executor and signals.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// One debounced batch of changed paths, relative to the project root.
    ChangesDetected { paths: Vec<String> },
    /// A pipeline started by the runtime completed.
    PipelineFinished {
        rule: String,
        pipeline: TaskName,
        outcome: PipelineOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod dispatcher;
pub mod executor;
pub mod runtime;

pub use core::{CoreCommand, CoreStep, DispatchCore};
pub use dispatcher::Dispatcher;
pub use executor::{PipelineExecutor, RegistryExecutor};
pub use runtime::Runtime;
