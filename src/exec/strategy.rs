// src/exec/strategy.rs

//! The two ways a set of ready tasks is executed.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use crate::dag::{SharedTracker, TaskDescriptor, TaskRunState};
use crate::engine::{TaskLogger, TaskName};
use crate::errors::Result;
use crate::exec::runner::run_single;

/// What happened to the tasks handed to one strategy call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyReport {
    pub completed: Vec<TaskName>,
    pub failed: Vec<TaskName>,
    /// Tasks a strictly-ordered call abandoned after an earlier failure.
    /// They are still pending.
    pub not_started: Vec<TaskName>,
}

impl StrategyReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Dispatch every task at once and wait until all of them have settled.
///
/// Each task runs in its own Tokio task. A failure never cancels siblings;
/// the report is produced only after every member is terminal.
pub async fn run_concurrent_batch(
    batch: Vec<TaskDescriptor>,
    tracker: &SharedTracker,
    logger: &Arc<dyn TaskLogger>,
) -> StrategyReport {
    let names: Vec<TaskName> = batch.iter().map(|t| t.name().to_string()).collect();
    info!(tasks = ?names, "dispatching concurrent batch");

    let handles: Vec<_> = batch
        .into_iter()
        .map(|task| tokio::spawn(run_single(task, tracker.clone(), Arc::clone(logger))))
        .collect();

    let results = join_all(handles).await;
    let mut report = StrategyReport::default();

    for (name, joined) in names.into_iter().zip(results) {
        if settle(&name, joined, tracker) {
            report.completed.push(name);
        } else {
            report.failed.push(name);
        }
    }

    debug!(
        completed = ?report.completed,
        failed = ?report.failed,
        "concurrent batch settled"
    );
    report
}

/// Run tasks one after another in the given order.
///
/// Each task fully finishes before the next starts. The first failure
/// abandons the rest of this call; abandoned tasks stay pending. Each task
/// still runs in its own Tokio task so a panic is contained like in a batch.
pub async fn run_strictly_ordered(
    tasks: Vec<TaskDescriptor>,
    tracker: &SharedTracker,
    logger: &Arc<dyn TaskLogger>,
) -> StrategyReport {
    let names: Vec<TaskName> = tasks.iter().map(|t| t.name().to_string()).collect();
    info!(tasks = ?names, "dispatching strictly-ordered run");

    let mut report = StrategyReport::default();
    let mut iter = tasks.into_iter();

    while let Some(task) = iter.next() {
        let name = task.name().to_string();
        let joined = tokio::spawn(run_single(task, tracker.clone(), Arc::clone(logger))).await;
        if settle(&name, joined, tracker) {
            report.completed.push(name);
        } else {
            report.failed.push(name.clone());
            report.not_started = iter.by_ref().map(|t| t.name().to_string()).collect();
            warn!(
                task = %name,
                abandoned = ?report.not_started,
                "strictly-ordered run aborted on failure"
            );
            break;
        }
    }

    report
}

/// Turn one joined task into success or failure. Returns `true` on success.
///
/// The runner catches body panics, so a join error means a logger hook
/// panicked. The task is forced terminal so the run can end.
fn settle(
    name: &str,
    joined: std::result::Result<Result<()>, JoinError>,
    tracker: &SharedTracker,
) -> bool {
    match joined {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            debug!(task = %name, error = %err, "task failed");
            false
        }
        Err(join_err) => {
            error!(task = %name, error = %join_err, "task aborted");
            if tracker.state_of(name) == TaskRunState::Completed {
                return true;
            }
            if tracker.state_of(name) == TaskRunState::Pending {
                tracker.mark_running(name);
            }
            if tracker.state_of(name) == TaskRunState::Running {
                tracker.mark_failed(name);
            }
            false
        }
    }
}
