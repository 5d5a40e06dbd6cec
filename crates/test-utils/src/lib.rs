//! Shared helpers for waverun's integration tests.
//!
//! - [`builders`]: task descriptors with scripted bodies, config builders
//! - [`recorder`]: a recording [`waverun::TaskLogger`] and a body-side journal

pub mod builders;
pub mod recorder;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for any single async test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per test binary.
///
/// Output shows up only for failing tests (or with `--nocapture`). Levels
/// come from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Run a future, failing the test if it does not finish within
/// [`TEST_TIMEOUT`]. A hung engine shows up as this panic.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("test timed out; the engine may be stuck")
}
