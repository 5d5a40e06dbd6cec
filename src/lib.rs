// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::dag::{DagGraph, TaskStateTracker};
use crate::engine::{Orchestrator, TracingLogger};

pub use crate::dag::TaskDescriptor;
pub use crate::engine::{TaskLogger, execute_tasks};
pub use crate::errors::WaverunError;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - optional restriction to one task's dependency closure
/// - dry-run planning, or a real run through the orchestrator
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let mut tasks = cfg.to_descriptors(&config_root_dir(&config_path));
    if let Some(target) = &args.task {
        tasks = restrict_to_task(tasks, target)?;
        info!(task = %target, selected = tasks.len(), "restricting run to dependency closure");
    }

    let orchestrator = Orchestrator::with_options(tasks, TracingLogger, cfg.engine_options());

    if args.dry_run {
        print_dry_run(&cfg, &orchestrator);
        return Ok(());
    }

    let summary = orchestrator.run().await?;
    info!(
        waves = summary.waves,
        completed = summary.completed.len(),
        "waverun finished"
    );
    Ok(())
}

/// Commands run relative to the config file's directory.
///
/// A bare filename like "Waverun.toml" (parent = "") falls back to the
/// current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Keep `target` and its transitive dependencies, preserving order.
pub fn restrict_to_task(
    tasks: Vec<TaskDescriptor>,
    target: &str,
) -> errors::Result<Vec<TaskDescriptor>> {
    let keep: HashSet<String> = DagGraph::from_descriptors(&tasks)
        .dependency_closure(target)?
        .into_iter()
        .collect();

    Ok(tasks
        .into_iter()
        .filter(|t| keep.contains(t.name()))
        .collect())
}

/// Print tasks, their dependencies and the planned waves.
fn print_dry_run(cfg: &ConfigFile, orchestrator: &Orchestrator) {
    let tasks = orchestrator.tasks();
    let graph = DagGraph::from_descriptors(tasks);

    println!("waverun dry-run");
    println!("  config.idle_wait_ms = {}", cfg.config().idle_wait_ms);
    if let Some(shell) = &cfg.config().shell {
        println!("  config.shell = {shell}");
    }
    println!();

    println!("tasks ({}):", tasks.len());
    for task in tasks {
        println!("  - {}", task.name());
        if let Some(tc) = cfg.tasks().get(task.name()) {
            println!("      cmd: {}", tc.cmd);
        }
        println!("      mode: {}", task.mode());
        if !task.depends_on().is_empty() {
            println!("      after: {:?}", task.depends_on());
        }
        let dependents = graph.dependents_of(task.name());
        if !dependents.is_empty() {
            println!("      unblocks: {:?}", dependents);
        }
    }
    println!();

    let (waves, stall) = orchestrator.plan();
    println!("planned waves ({}):", waves.len());
    for wave in &waves {
        println!(
            "  {}: parallel {:?} then sequential {:?}",
            wave.wave,
            wave.parallel_names(),
            wave.sequential_names()
        );
    }

    if let Some(order) = graph.topological_order() {
        println!("topological order: {}", order.join(", "));
    }

    if let Some(err) = stall {
        println!();
        println!("the run would stall: {err}");
        let all: Vec<String> = graph.tasks().map(str::to_string).collect();
        let diagnosis = graph.diagnose(&all, &TaskStateTracker::new());
        for cycle in &diagnosis.cycles {
            println!("  cycle: {}", cycle.join(" -> "));
        }
        for edge in &diagnosis.missing {
            println!("  unknown dependency: {edge}");
        }
    }

    debug!("dry-run complete (no execution)");
}
