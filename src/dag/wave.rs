// src/dag/wave.rs

//! One wave: a readiness computation split by concurrency group.

use std::collections::HashSet;

use crate::dag::task_info::TaskDescriptor;
use crate::engine::TaskName;

/// The tasks found ready in one wave, split into the two dispatch groups.
///
/// `parallel` is dispatched as a concurrent batch and must fully settle
/// before `sequential` starts.
#[derive(Debug, Clone)]
pub struct WavePlan {
    /// 1-based wave number within the run.
    pub wave: u64,
    pub parallel: Vec<TaskDescriptor>,
    pub sequential: Vec<TaskDescriptor>,
}

impl WavePlan {
    /// Intersect `ready` with the fixed parallel-capable group; everything
    /// else goes to the strictly-ordered tail, in `ready` order.
    pub fn partition(
        wave: u64,
        ready: &[&TaskDescriptor],
        parallel_group: &HashSet<TaskName>,
    ) -> Self {
        let (parallel, sequential): (Vec<_>, Vec<_>) = ready
            .iter()
            .map(|t| (*t).clone())
            .partition(|t| parallel_group.contains(t.name()));

        Self {
            wave,
            parallel,
            sequential,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parallel.is_empty() && self.sequential.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parallel.len() + self.sequential.len()
    }

    pub fn parallel_names(&self) -> Vec<&str> {
        self.parallel.iter().map(|t| t.name()).collect()
    }

    pub fn sequential_names(&self) -> Vec<&str> {
        self.sequential.iter().map(|t| t.name()).collect()
    }
}
