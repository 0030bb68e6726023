use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Canonical task name type used throughout the registry and engine.
pub type TaskName = String;

/// Boxed, sendable future used at the trait seams (site builds, server
/// start, task runnables) so they stay object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Which site-generator configuration a build uses.
///
/// Chosen once per invocation: `build` uses `Development`, `build:prod`
/// and `deploy` use `Production`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEnvironment {
    Development,
    Production,
}

impl fmt::Display for BuildEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildEnvironment::Development => f.write_str("development"),
            BuildEnvironment::Production => f.write_str("production"),
        }
    }
}

/// Kind of entry in the task registry, used for listings and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// A single runnable unit.
    Unit,
    /// Members started together; order not guaranteed.
    Composite,
    /// Members run strictly one after another.
    Sequence,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Unit => f.pad("unit"),
            TaskKind::Composite => f.pad("composite"),
            TaskKind::Sequence => f.pad("sequence"),
        }
    }
}
