// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WaverunError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WaverunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task))
    }
}

/// Structural checks only.
///
/// Unknown `after` references and cycles are accepted here: the engine
/// reports them as a deadlock with a diagnosis, and `--dry-run` shows the
/// same diagnosis without running anything.
fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_commands(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(WaverunError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.idle_wait_ms == 0 {
        return Err(WaverunError::ConfigError(
            "[config].idle_wait_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(shell) = &cfg.config.shell {
        if shell.trim().is_empty() {
            return Err(WaverunError::ConfigError(
                "[config].shell must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_commands(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if task.cmd.trim().is_empty() {
            return Err(WaverunError::ConfigError(format!(
                "task '{}' has an empty `cmd`",
                name
            )));
        }
    }
    Ok(())
}
