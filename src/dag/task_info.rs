// src/dag/task_info.rs

//! Task descriptors and per-task state.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::engine::TaskName;
use crate::exec::{FnBody, TaskBody};
use crate::types::ConcurrencyMode;

/// Public, read-only view of where a task is in its lifecycle.
///
/// Derived from the tracker's three sets: a name in none of them is
/// `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskRunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskRunState::Completed | TaskRunState::Failed)
    }
}

/// A named unit of work, its dependencies and its concurrency eligibility.
///
/// Built once by the caller and handed to the engine. The builder methods
/// consume `self`, so a descriptor cannot change once it is in the engine's
/// hands. Cloning is cheap: the body is shared behind an `Arc`.
#[derive(Clone)]
pub struct TaskDescriptor {
    name: TaskName,
    depends_on: Vec<TaskName>,
    mode: ConcurrencyMode,
    body: Arc<dyn TaskBody>,
}

impl TaskDescriptor {
    /// A parallel-capable task with no dependencies.
    pub fn new(name: impl Into<TaskName>, body: impl TaskBody + 'static) -> Self {
        Self {
            name: name.into(),
            depends_on: Vec::new(),
            mode: ConcurrencyMode::Parallel,
            body: Arc::new(body),
        }
    }

    /// Build a task whose body is an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<TaskName>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(name, FnBody::new(f))
    }

    /// Add one dependency.
    pub fn after(mut self, dep: impl Into<TaskName>) -> Self {
        self.depends_on.push(dep.into());
        self
    }

    /// Add several dependencies.
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.depends_on.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn with_mode(mut self, mode: ConcurrencyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Mark the task sequential-only.
    pub fn sequential(self) -> Self {
        self.with_mode(ConcurrencyMode::Sequential)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depends_on(&self) -> &[TaskName] {
        &self.depends_on
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    pub fn concurrency_eligible(&self) -> bool {
        self.mode.is_parallel()
    }

    pub fn body(&self) -> Arc<dyn TaskBody> {
        Arc::clone(&self.body)
    }
}

impl fmt::Debug for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDescriptor")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
