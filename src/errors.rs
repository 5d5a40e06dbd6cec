// src/errors.rs

//! Crate-wide error type and helpers.

use thiserror::Error;

use crate::dag::StallDiagnosis;
use crate::engine::TaskName;

#[derive(Error, Debug)]
pub enum WaverunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A single task body returned an error (or panicked).
    #[error("task '{task}' failed: {error:#}")]
    TaskFailed { task: TaskName, error: anyhow::Error },

    /// Nothing is ready, nothing is running, and tasks remain.
    #[error("deadlock: no remaining task can become ready: {}", .remaining.join(", "))]
    Deadlock {
        remaining: Vec<TaskName>,
        /// Tasks that had already failed when the deadlock was detected.
        failed: Vec<TaskName>,
        diagnosis: StallDiagnosis,
    },

    /// The run finished with at least one failed task.
    #[error("{} task(s) failed: {}", .failed.len(), .failed.join(", "))]
    TasksFailed { failed: Vec<TaskName> },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WaverunError {
    /// Names of the tasks this error is about, if it is a run outcome.
    pub fn task_names(&self) -> &[TaskName] {
        match self {
            WaverunError::Deadlock { remaining, .. } => remaining,
            WaverunError::TasksFailed { failed } => failed,
            WaverunError::TaskFailed { task, .. } => std::slice::from_ref(task),
            _ => &[],
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WaverunError>;
