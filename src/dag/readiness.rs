// src/dag/readiness.rs

//! Pure readiness and deadlock checks over a task list and a tracker view.

use tracing::{debug, error};

use crate::dag::graph::DagGraph;
use crate::dag::task_info::{TaskDescriptor, TaskRunState};
use crate::dag::tracker::TaskStateTracker;
use crate::errors::{Result, WaverunError};

/// `true` if every dependency of `task` is completed (vacuously for none).
pub fn dependencies_satisfied(task: &TaskDescriptor, tracker: &TaskStateTracker) -> bool {
    task.depends_on().iter().all(|dep| tracker.is_completed(dep))
}

/// Pending tasks whose dependencies are all completed, in input order.
///
/// Callers may rely on the order for convenience (the strictly-ordered
/// strategy runs its share in this order) but not for correctness.
pub fn ready_tasks<'t>(
    tasks: &'t [TaskDescriptor],
    tracker: &TaskStateTracker,
) -> Vec<&'t TaskDescriptor> {
    tasks
        .iter()
        .filter(|t| tracker.state_of(t.name()) == TaskRunState::Pending)
        .filter(|t| dependencies_satisfied(t, tracker))
        .collect()
}

/// Decide whether an empty ready set means the run can never finish.
///
/// Only meaningful when [`ready_tasks`] returned nothing. If some task is
/// still running, returns `Ok(())`: the caller must wait for it and
/// re-evaluate. If nothing is running and tasks remain, returns
/// [`WaverunError::Deadlock`] naming every remaining task.
pub fn detect_deadlock(tasks: &[TaskDescriptor], tracker: &TaskStateTracker) -> Result<()> {
    let remaining = tracker.remaining_tasks(tasks);

    if remaining.is_empty() || tracker.running_count() > 0 {
        debug!(
            remaining = remaining.len(),
            running = tracker.running_count(),
            "nothing ready; not a deadlock"
        );
        return Ok(());
    }

    let remaining: Vec<_> = remaining.iter().map(|t| t.name().to_string()).collect();
    let failed: Vec<_> = tasks
        .iter()
        .filter(|t| tracker.is_failed(t.name()))
        .map(|t| t.name().to_string())
        .collect();

    let diagnosis = DagGraph::from_descriptors(tasks).diagnose(&remaining, tracker);

    error!(
        ?remaining,
        cycles = ?diagnosis.cycles,
        missing = ?diagnosis.missing,
        blocked_by_failure = ?diagnosis.blocked_by_failure,
        "deadlock detected"
    );

    Err(WaverunError::Deadlock {
        remaining,
        failed,
        diagnosis,
    })
}
