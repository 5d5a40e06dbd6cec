// src/exec/runner.rs

//! Lifecycle of a single task.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::anyhow;
use futures::FutureExt;
use tracing::debug;

use crate::dag::{SharedTracker, TaskDescriptor};
use crate::engine::TaskLogger;
use crate::errors::{Result, WaverunError};

/// Run one task body and record its outcome.
///
/// Order of effects:
/// 1. tracker -> running, then `logger.start_task`; a task that is not
///    pending is refused before the logger hears about it
/// 2. the body runs; a panic is caught and treated as an error
/// 3. success: `logger.end_task(true)`, tracker -> completed
/// 4. failure: `logger.end_task(false)`, `logger.error`, tracker -> failed,
///    and the error is returned to the calling strategy
pub async fn run_single(
    task: TaskDescriptor,
    tracker: SharedTracker,
    logger: Arc<dyn TaskLogger>,
) -> Result<()> {
    let name = task.name().to_string();

    if !tracker.mark_running(&name) {
        return Err(WaverunError::Other(anyhow!(
            "task '{name}' was dispatched while not pending"
        )));
    }
    logger.start_task(&name);

    let body = task.body();
    let result = match AssertUnwindSafe(body.run()).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(anyhow!("task body panicked: {}", panic_message(panic.as_ref()))),
    };

    match result {
        Ok(()) => {
            logger.end_task(&name, true);
            tracker.mark_completed(&name);
            debug!(task = %name, "task body succeeded");
            Ok(())
        }
        Err(error) => {
            logger.end_task(&name, false);
            logger.error(&format!("task '{name}' failed"), &error);
            tracker.mark_failed(&name);
            Err(WaverunError::TaskFailed { task: name, error })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
