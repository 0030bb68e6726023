// src/lib.rs

pub mod assets;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod server;
pub mod site;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::engine::Dispatcher;
use crate::errors::Result;
use crate::tasks::graph::TaskGraph;
use crate::tasks::standard::names;
use crate::tasks::{Components, TaskRegistry, standard_registry};
use crate::types::TaskKind;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the config (missing paths fail here, before anything
/// runs), builds the task registry and runs the requested task.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    debug!(root = ?cfg.root(), "configuration loaded");

    let components = Components::from_config(&cfg)?;
    let registry = Arc::new(standard_registry(&components)?);

    if args.list {
        print_task_list(&registry);
        return Ok(());
    }

    run_task(&cfg, registry, &args.task).await
}

/// Dispatch a task name: `serve` and `deploy` go through the dispatcher,
/// `browser` keeps serving until Ctrl-C, anything else is a registry run.
pub async fn run_task(cfg: &ConfigFile, registry: Arc<TaskRegistry>, task: &str) -> Result<()> {
    match task {
        names::SERVE => Dispatcher::from_config(cfg, registry)?.serve().await,
        names::DEPLOY => Dispatcher::from_config(cfg, registry)?.deploy().await,
        names::BROWSER => {
            registry.run(names::BROWSER).await?;
            info!("press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            Ok(())
        }
        other => registry.run(other).await,
    }
}

fn print_task_list(registry: &TaskRegistry) {
    let graph = TaskGraph::from_registry(registry);

    println!("tasks:");
    println!("  {:<20} {:<10} watch, rebuild and live-reload (default)", names::SERVE, "session");
    for (name, kind, members) in registry.list() {
        if members.is_empty() {
            println!("  {name:<20} {kind:<10}");
        } else {
            let sep = if kind == TaskKind::Sequence { " -> " } else { ", " };
            let units = graph.leaf_units(registry, name);
            println!(
                "  {name:<20} {kind:<10} {} (units: {})",
                members.join(sep),
                units.join(", ")
            );
        }
    }
}
