// src/config/model.rs

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::dag::TaskDescriptor;
use crate::engine::EngineOptions;
use crate::exec::CommandBody;
use crate::types::ConcurrencyMode;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// idle_wait_ms = 50
///
/// [task.tokens]
/// cmd = "node scripts/build-tokens.js"
///
/// [task.css]
/// cmd = "node scripts/build-css.js"
/// after = ["tokens"]
/// mode = "sequential"
/// ```
///
/// This is the unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Engine behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Upper bound, in milliseconds, on how long the engine waits for
    /// in-flight work before re-checking readiness.
    #[serde(default = "default_idle_wait_ms")]
    pub idle_wait_ms: u64,

    /// Shell used for `cmd`; defaults to `sh` (`cmd` on Windows).
    #[serde(default)]
    pub shell: Option<String>,
}

fn default_idle_wait_ms() -> u64 {
    50
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            idle_wait_ms: default_idle_wait_ms(),
            shell: None,
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// The command to execute.
    pub cmd: String,

    /// Tasks that must complete before this one starts.
    #[serde(default)]
    pub after: Vec<String>,

    /// `"parallel"` (default) or `"sequential"`.
    #[serde(default)]
    pub mode: ConcurrencyMode,
}

/// A validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { config, task }
    }

    pub fn config(&self) -> &ConfigSection {
        &self.config
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskConfig> {
        &self.task
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            idle_wait: Duration::from_millis(self.config.idle_wait_ms),
        }
    }

    /// One command-backed descriptor per `[task.<name>]`, in name order.
    ///
    /// Commands run with `root` as their working directory.
    pub fn to_descriptors(&self, root: &Path) -> Vec<TaskDescriptor> {
        self.task
            .iter()
            .map(|(name, tc)| {
                let mut body = CommandBody::new(name.clone(), tc.cmd.clone()).with_cwd(root);
                if let Some(shell) = &self.config.shell {
                    body = body.with_shell(shell.clone());
                }
                TaskDescriptor::new(name.clone(), body)
                    .with_dependencies(tc.after.iter().cloned())
                    .with_mode(tc.mode)
            })
            .collect()
    }
}
