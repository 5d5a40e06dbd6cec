// src/dag/tracker.rs

//! Per-run state bookkeeping for tasks.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::dag::task_info::{TaskDescriptor, TaskRunState};
use crate::engine::TaskName;

/// Which tasks are completed, running or failed in the current run.
///
/// The three sets are disjoint. A name in none of them is pending. The only
/// legal transitions are pending -> running -> completed | failed; any other
/// request is logged and ignored, and the `mark_*` call returns `false`.
#[derive(Debug, Default)]
pub struct TaskStateTracker {
    completed: HashSet<TaskName>,
    running: HashSet<TaskName>,
    failed: HashSet<TaskName>,
}

impl TaskStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_running(&mut self, name: &str) -> bool {
        match self.state_of(name) {
            TaskRunState::Pending => {
                self.running.insert(name.to_string());
                debug!(task = %name, "task marked Running");
                true
            }
            state => {
                warn!(task = %name, ?state, "mark_running on a non-pending task; ignoring");
                false
            }
        }
    }

    pub fn mark_completed(&mut self, name: &str) -> bool {
        if !self.running.remove(name) {
            warn!(
                task = %name,
                state = ?self.state_of(name),
                "mark_completed on a task that is not running; ignoring"
            );
            return false;
        }
        self.completed.insert(name.to_string());
        debug!(task = %name, "task marked Completed");
        true
    }

    pub fn mark_failed(&mut self, name: &str) -> bool {
        if !self.running.remove(name) {
            warn!(
                task = %name,
                state = ?self.state_of(name),
                "mark_failed on a task that is not running; ignoring"
            );
            return false;
        }
        self.failed.insert(name.to_string());
        debug!(task = %name, "task marked Failed");
        true
    }

    pub fn is_completed(&self, name: &str) -> bool {
        self.completed.contains(name)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.contains(name)
    }

    pub fn is_failed(&self, name: &str) -> bool {
        self.failed.contains(name)
    }

    pub fn state_of(&self, name: &str) -> TaskRunState {
        if self.completed.contains(name) {
            TaskRunState::Completed
        } else if self.failed.contains(name) {
            TaskRunState::Failed
        } else if self.running.contains(name) {
            TaskRunState::Running
        } else {
            TaskRunState::Pending
        }
    }

    /// Tasks that are in none of the three sets, in the order given.
    pub fn remaining_tasks<'t>(&self, all_tasks: &'t [TaskDescriptor]) -> Vec<&'t TaskDescriptor> {
        all_tasks
            .iter()
            .filter(|t| self.state_of(t.name()) == TaskRunState::Pending)
            .collect()
    }

    pub fn terminal_count(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn completed(&self) -> &HashSet<TaskName> {
        &self.completed
    }

    pub fn failed(&self) -> &HashSet<TaskName> {
        &self.failed
    }
}

/// Cloneable handle to the tracker of one run.
///
/// Every mutation goes through the mutex, so batch members running on
/// different worker threads never interleave inside a transition. Terminal
/// transitions also wake whoever is waiting in [`SharedTracker::wait_for_change`].
#[derive(Debug, Clone, Default)]
pub struct SharedTracker {
    inner: Arc<Mutex<TaskStateTracker>>,
    changed: Arc<Notify>,
}

impl SharedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_running(&self, name: &str) -> bool {
        self.inner.lock().mark_running(name)
    }

    pub fn mark_completed(&self, name: &str) -> bool {
        let applied = self.inner.lock().mark_completed(name);
        if applied {
            self.changed.notify_one();
        }
        applied
    }

    pub fn mark_failed(&self, name: &str) -> bool {
        let applied = self.inner.lock().mark_failed(name);
        if applied {
            self.changed.notify_one();
        }
        applied
    }

    pub fn state_of(&self, name: &str) -> TaskRunState {
        self.inner.lock().state_of(name)
    }

    /// Run `f` against a consistent view of the tracker.
    ///
    /// The lock is released before this returns; never hold a view across
    /// an `.await`.
    pub fn with_view<R>(&self, f: impl FnOnce(&TaskStateTracker) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Wait until some task reaches a terminal state, or `bound` elapses.
    ///
    /// Returns `true` if woken by a transition.
    pub async fn wait_for_change(&self, bound: Duration) -> bool {
        tokio::time::timeout(bound, self.changed.notified())
            .await
            .is_ok()
    }
}
