// src/dag/mod.rs

//! Task graph representation and readiness logic.
//!
//! - [`task_info`] holds the immutable [`TaskDescriptor`] and the public
//!   per-task state view.
//! - [`tracker`] owns the per-run completed / running / failed bookkeeping.
//! - [`readiness`] contains the pure functions that decide which tasks may
//!   start now and whether the run is deadlocked.
//! - [`wave`] splits one readiness computation into a parallel batch and a
//!   strictly-ordered tail.
//! - [`graph`] keeps adjacency information for diagnostics and planning.

pub mod graph;
pub mod readiness;
pub mod task_info;
pub mod tracker;
pub mod wave;

pub use graph::{BlockedEdge, DagGraph, StallDiagnosis};
pub use readiness::{dependencies_satisfied, detect_deadlock, ready_tasks};
pub use task_info::{TaskDescriptor, TaskRunState};
pub use tracker::{SharedTracker, TaskStateTracker};
pub use wave::WavePlan;
