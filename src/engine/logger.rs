// src/engine/logger.rs

//! Lifecycle observer for task execution.

use std::sync::Arc;

use tracing::{error, info, warn};

/// Receives task lifecycle notifications.
///
/// The engine calls these for observability only and never depends on what
/// an implementation does with them. Hooks may be called concurrently from
/// several batch members.
pub trait TaskLogger: Send + Sync {
    fn start_task(&self, name: &str);
    fn end_task(&self, name: &str, success: bool);
    fn error(&self, message: &str, err: &anyhow::Error);
}

impl<T: TaskLogger + ?Sized> TaskLogger for Arc<T> {
    fn start_task(&self, name: &str) {
        (**self).start_task(name)
    }

    fn end_task(&self, name: &str, success: bool) {
        (**self).end_task(name, success)
    }

    fn error(&self, message: &str, err: &anyhow::Error) {
        (**self).error(message, err)
    }
}

/// Forwards lifecycle events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TaskLogger for TracingLogger {
    fn start_task(&self, name: &str) {
        info!(task = %name, "task started");
    }

    fn end_task(&self, name: &str, success: bool) {
        if success {
            info!(task = %name, success, "task finished");
        } else {
            warn!(task = %name, success, "task finished");
        }
    }

    fn error(&self, message: &str, err: &anyhow::Error) {
        error!(error = %format!("{err:#}"), "{message}");
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl TaskLogger for NoopLogger {
    fn start_task(&self, _name: &str) {}

    fn end_task(&self, _name: &str, _success: bool) {}

    fn error(&self, _message: &str, _err: &anyhow::Error) {}
}
