// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`body`] defines the [`TaskBody`] trait that every unit of work
//!   implements, plus an adapter for async closures.
//! - [`command`] provides a body that runs a shell command with
//!   `tokio::process::Command`.
//! - [`runner`] performs the lifecycle of a single task: logger hooks,
//!   tracker transitions and panic isolation.
//! - [`strategy`] runs a set of ready tasks either as a concurrent batch or
//!   strictly in order.

pub mod body;
pub mod command;
pub mod runner;
pub mod strategy;

pub use body::{BodyFuture, FnBody, TaskBody};
pub use command::CommandBody;
pub use runner::run_single;
pub use strategy::{StrategyReport, run_concurrent_batch, run_strictly_ordered};
