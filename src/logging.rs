// src/logging.rs

//! Logging setup for `waverun` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` CLI flag (applies to every target)
//! 2. `WAVERUN_LOG`, which takes full `EnvFilter` directives, e.g.
//!    `info,waverun::exec=debug`
//! 3. `info`
//!
//! Logs go to STDERR so task stdout forwarding stays readable when piped.

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "WAVERUN_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Initialise the global logging subscriber.
///
/// Call once at startup; a second call returns an error.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env_value.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Resolve the filter from the CLI flag and the raw `WAVERUN_LOG` value.
///
/// A blank env value counts as unset. Malformed directives are an error
/// rather than being silently dropped.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(level.as_directive()));
    }

    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV} value `{directives}`")),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}
