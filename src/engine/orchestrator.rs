// src/engine/orchestrator.rs

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use crate::dag::{
    SharedTracker, TaskDescriptor, TaskStateTracker, WavePlan, detect_deadlock, ready_tasks,
};
use crate::engine::{EngineOptions, TaskLogger, TaskName};
use crate::errors::{Result, WaverunError};
use crate::exec::{run_concurrent_batch, run_strictly_ordered};

/// Successful outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of waves executed.
    pub waves: u64,
    /// Every task, in input order (all of them completed).
    pub completed: Vec<TaskName>,
}

/// Top-level driver for one engine invocation.
///
/// Each call to [`Orchestrator::run`] owns a fresh tracker and repeatedly:
/// 1. computes the ready set,
/// 2. on an empty set, either raises a deadlock or waits for in-flight work,
/// 3. runs the parallel-capable share as a concurrent batch and waits for it
///    to settle,
/// 4. runs the sequential-only share strictly in order,
///
/// until every task is terminal. Failed tasks never stop the loop; they are
/// aggregated into one error at the end.
pub struct Orchestrator {
    tasks: Vec<TaskDescriptor>,
    logger: Arc<dyn TaskLogger>,
    options: EngineOptions,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("tasks", &self.tasks)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(tasks: Vec<TaskDescriptor>, logger: impl TaskLogger + 'static) -> Self {
        Self::with_options(tasks, logger, EngineOptions::default())
    }

    /// Task names are expected to be unique. A repeated name is warned about
    /// and only its first descriptor is kept.
    pub fn with_options(
        tasks: Vec<TaskDescriptor>,
        logger: impl TaskLogger + 'static,
        options: EngineOptions,
    ) -> Self {
        Self {
            tasks: dedup_by_name(tasks),
            logger: Arc::new(logger),
            options,
        }
    }

    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    /// Predict the waves of a run in which every task succeeds.
    ///
    /// Nothing is executed. If the tasks can never all finish, the waves
    /// computed so far are returned together with the deadlock error the
    /// real run would raise.
    pub fn plan(&self) -> (Vec<WavePlan>, Option<WaverunError>) {
        let parallel_group = parallel_group(&self.tasks);
        let mut tracker = TaskStateTracker::new();
        let mut waves = Vec::new();

        while tracker.terminal_count() < self.tasks.len() {
            let ready = ready_tasks(&self.tasks, &tracker);
            if ready.is_empty() {
                return match detect_deadlock(&self.tasks, &tracker) {
                    Err(err) => (waves, Some(err)),
                    Ok(()) => (waves, None),
                };
            }

            let plan = WavePlan::partition(waves.len() as u64 + 1, &ready, &parallel_group);
            for task in plan.parallel.iter().chain(plan.sequential.iter()) {
                tracker.mark_running(task.name());
                tracker.mark_completed(task.name());
            }
            waves.push(plan);
        }

        (waves, None)
    }

    /// Execute every task.
    ///
    /// Returns [`WaverunError::Deadlock`] as soon as no task can make
    /// progress, or [`WaverunError::TasksFailed`] after the loop ends with
    /// failed tasks.
    pub async fn run(self) -> Result<RunSummary> {
        let tracker = SharedTracker::new();
        let total = self.tasks.len();
        let parallel_group = parallel_group(&self.tasks);

        info!(
            total,
            parallel = parallel_group.len(),
            sequential = total - parallel_group.len(),
            "task engine started"
        );

        let mut wave: u64 = 0;

        while tracker.with_view(|view| view.terminal_count()) < total {
            let next = tracker.with_view(|view| {
                let ready = ready_tasks(&self.tasks, view);
                if ready.is_empty() {
                    detect_deadlock(&self.tasks, view).map(|()| None)
                } else {
                    Ok(Some(WavePlan::partition(wave + 1, &ready, &parallel_group)))
                }
            })?;

            let Some(plan) = next else {
                trace!("no task ready; waiting for in-flight work");
                tracker.wait_for_change(self.options.idle_wait).await;
                continue;
            };

            wave = plan.wave;
            info!(
                wave,
                parallel = ?plan.parallel_names(),
                sequential = ?plan.sequential_names(),
                "starting wave"
            );

            if !plan.parallel.is_empty() {
                let report = run_concurrent_batch(plan.parallel, &tracker, &self.logger).await;
                debug!(wave, ?report, "parallel share of wave settled");
            }

            if !plan.sequential.is_empty() {
                let report = run_strictly_ordered(plan.sequential, &tracker, &self.logger).await;
                debug!(wave, ?report, "sequential share of wave finished");
            }
        }

        let names_in = |set: &HashSet<TaskName>| -> Vec<TaskName> {
            self.tasks
                .iter()
                .map(|t| t.name())
                .filter(|name| set.contains(*name))
                .map(str::to_string)
                .collect()
        };
        let (completed, failed) =
            tracker.with_view(|view| (names_in(view.completed()), names_in(view.failed())));

        if !failed.is_empty() {
            error!(waves = wave, ?failed, "run finished with failed tasks");
            return Err(WaverunError::TasksFailed { failed });
        }

        info!(waves = wave, completed = completed.len(), "all tasks completed");
        Ok(RunSummary {
            waves: wave,
            completed,
        })
    }
}

/// Run `tasks` to completion, reporting lifecycle events to `logger`.
pub async fn execute_tasks(
    tasks: Vec<TaskDescriptor>,
    logger: impl TaskLogger + 'static,
) -> Result<()> {
    Orchestrator::new(tasks, logger).run().await.map(|_| ())
}

/// Names of the concurrency-eligible tasks. Fixed for the whole run.
fn parallel_group(tasks: &[TaskDescriptor]) -> HashSet<TaskName> {
    tasks
        .iter()
        .filter(|t| t.concurrency_eligible())
        .map(|t| t.name().to_string())
        .collect()
}

fn dedup_by_name(tasks: Vec<TaskDescriptor>) -> Vec<TaskDescriptor> {
    let mut seen: HashSet<TaskName> = HashSet::new();
    tasks
        .into_iter()
        .filter(|t| {
            let fresh = seen.insert(t.name().to_string());
            if !fresh {
                warn!(task = %t.name(), "duplicate task name; keeping the first descriptor");
            }
            fresh
        })
        .collect()
}
