// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the readiness resolver and tracker from [`crate::dag`]
//! - the execution strategies from [`crate::exec`]
//! - the [`TaskLogger`] collaborator that observes task lifecycles
//!
//! The top-level loop lives in [`orchestrator`].

use std::time::Duration;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Bound on the idle wait when nothing is ready but work is in flight.
pub const DEFAULT_IDLE_WAIT: Duration = Duration::from_millis(50);

/// Tunables for one engine invocation.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// How long the loop waits for a terminal transition before it
    /// re-evaluates readiness anyway.
    pub idle_wait: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            idle_wait: DEFAULT_IDLE_WAIT,
        }
    }
}

pub mod logger;
pub mod orchestrator;

pub use logger::{NoopLogger, TaskLogger, TracingLogger};
pub use orchestrator::{Orchestrator, RunSummary, execute_tasks};
