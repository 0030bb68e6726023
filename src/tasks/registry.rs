// src/tasks/registry.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::errors::{AssetflowError, Result};
use crate::tasks::graph::TaskGraph;
use crate::tasks::runnable::Runnable;
use crate::types::{BoxFuture, TaskKind, TaskName};

/// How a named task is made up.
#[derive(Clone)]
pub enum TaskDef {
    Unit(Arc<dyn Runnable>),
    /// Members start together; completes when all have completed.
    Composite(Vec<TaskName>),
    /// Members run one after another; the first failure aborts the rest.
    Sequence(Vec<TaskName>),
}

impl TaskDef {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskDef::Unit(_) => TaskKind::Unit,
            TaskDef::Composite(_) => TaskKind::Composite,
            TaskDef::Sequence(_) => TaskKind::Sequence,
        }
    }

    pub fn members(&self) -> &[TaskName] {
        match self {
            TaskDef::Unit(_) => &[],
            TaskDef::Composite(m) | TaskDef::Sequence(m) => m,
        }
    }
}

impl fmt::Debug for TaskDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskDef::Unit(_) => f.write_str("Unit"),
            TaskDef::Composite(m) => f.debug_tuple("Composite").field(m).finish(),
            TaskDef::Sequence(m) => f.debug_tuple("Sequence").field(m).finish(),
        }
    }
}

/// Name -> task definition map.
///
/// Built once at startup and then shared behind an `Arc`; running a task
/// never mutates the registry.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskDef>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R>(&mut self, name: impl Into<TaskName>, runnable: R) -> Result<()>
    where
        R: Runnable + 'static,
    {
        self.insert(name.into(), TaskDef::Unit(Arc::new(runnable)))
    }

    pub fn register_composite(&mut self, name: impl Into<TaskName>, members: &[&str]) -> Result<()> {
        self.insert(name.into(), TaskDef::Composite(to_names(members)))
    }

    pub fn register_sequence(&mut self, name: impl Into<TaskName>, members: &[&str]) -> Result<()> {
        self.insert(name.into(), TaskDef::Sequence(to_names(members)))
    }

    fn insert(&mut self, name: TaskName, def: TaskDef) -> Result<()> {
        if name.trim().is_empty() {
            return Err(AssetflowError::ConfigError(
                "task names must not be empty".to_string(),
            ));
        }
        if self.tasks.contains_key(&name) {
            return Err(AssetflowError::ConfigError(format!(
                "task '{name}' is registered twice"
            )));
        }
        self.tasks.insert(name, def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TaskDef> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskDef)> {
        self.tasks.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every member must name a registered task and the composition must be
    /// acyclic.
    pub fn validate(&self) -> Result<()> {
        for (name, def) in &self.tasks {
            for member in def.members() {
                if !self.tasks.contains_key(member) {
                    return Err(AssetflowError::TaskNotFound(format!(
                        "'{member}' (member of '{name}')"
                    )));
                }
            }
        }
        TaskGraph::from_registry(self).topological_order()?;
        Ok(())
    }

    /// Sorted `(name, kind, members)` listing for `--list`.
    pub fn list(&self) -> Vec<(&str, TaskKind, &[TaskName])> {
        self.tasks
            .iter()
            .map(|(name, def)| (name.as_str(), def.kind(), def.members()))
            .collect()
    }

    /// Run `name` to completion.
    ///
    /// The returned future owns a handle on the registry so it can be spawned.
    pub fn run(self: &Arc<Self>, name: &str) -> BoxFuture<'static, Result<()>> {
        let registry = Arc::clone(self);
        let name = name.to_string();
        Box::pin(async move { registry.run_named(name).await })
    }

    async fn run_named(self: Arc<Self>, name: TaskName) -> Result<()> {
        let def = self
            .tasks
            .get(&name)
            .cloned()
            .ok_or_else(|| AssetflowError::TaskNotFound(name.clone()))?;

        let started = Instant::now();
        info!(task = %name, "starting");

        let result = match def {
            TaskDef::Unit(runnable) => runnable.run().await,
            TaskDef::Sequence(members) => self.run_sequence(members).await,
            TaskDef::Composite(members) => self.run_composite(members).await,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => info!(task = %name, elapsed_ms, "finished"),
            Err(e) => error!(task = %name, elapsed_ms, error = %e, "failed"),
        }
        result
    }

    async fn run_sequence(self: &Arc<Self>, members: Vec<TaskName>) -> Result<()> {
        for member in members {
            self.run(&member).await?;
        }
        Ok(())
    }

    async fn run_composite(self: &Arc<Self>, members: Vec<TaskName>) -> Result<()> {
        let mut set = JoinSet::new();
        for member in &members {
            set.spawn(self.run(member));
        }

        while let Some(joined) = set.join_next().await {
            let outcome = match joined {
                Ok(res) => res,
                Err(join_err) => Err(AssetflowError::from(join_err)),
            };
            if let Err(e) = outcome {
                // Siblings keep running to completion; only the report is early.
                set.detach_all();
                return Err(e);
            }
        }
        Ok(())
    }
}

fn to_names(members: &[&str]) -> Vec<TaskName> {
    members.iter().map(|m| m.to_string()).collect()
}
