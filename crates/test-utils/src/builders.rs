#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::anyhow;
use waverun::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
use waverun::dag::TaskDescriptor;
use waverun::types::ConcurrencyMode;

use crate::recorder::{Journal, Mark};

/// Task that journals its start, yields once, journals its finish and
/// succeeds.
pub fn ok_task(name: &str, journal: &Journal) -> TaskDescriptor {
    delayed_task(name, Duration::ZERO, journal)
}

/// Like [`ok_task`] but sleeps for `delay` between start and finish.
pub fn delayed_task(name: &str, delay: Duration, journal: &Journal) -> TaskDescriptor {
    let journal = journal.clone();
    let task = name.to_string();
    TaskDescriptor::from_fn(name, move || {
        let journal = journal.clone();
        let task = task.clone();
        async move {
            journal.record(&task, Mark::Start);
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            journal.record(&task, Mark::Finish);
            anyhow::Ok(())
        }
    })
}

/// Task that journals start and finish, then returns an error.
pub fn failing_task(name: &str, journal: &Journal) -> TaskDescriptor {
    let journal = journal.clone();
    let task = name.to_string();
    TaskDescriptor::from_fn(name, move || {
        let journal = journal.clone();
        let task = task.clone();
        async move {
            journal.record(&task, Mark::Start);
            tokio::task::yield_now().await;
            journal.record(&task, Mark::Finish);
            Err::<(), _>(anyhow!("{task} exploded"))
        }
    })
}

/// Task whose body panics after journaling its start.
pub fn panicking_task(name: &str, journal: &Journal) -> TaskDescriptor {
    let journal = journal.clone();
    let task = name.to_string();
    TaskDescriptor::from_fn(name, move || {
        let journal = journal.clone();
        let task = task.clone();
        async move {
            journal.record(&task, Mark::Start);
            if !task.is_empty() {
                panic!("{task} panicked on purpose");
            }
            anyhow::Ok(())
        }
    })
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_idle_wait_ms(mut self, ms: u64) -> Self {
        self.config.config.idle_wait_ms = ms;
        self
    }

    pub fn with_shell(mut self, shell: &str) -> Self {
        self.config.config.shell = Some(shell.to_string());
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.to_string(),
                after: vec![],
                mode: ConcurrencyMode::Parallel,
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn sequential(mut self) -> Self {
        self.task.mode = ConcurrencyMode::Sequential;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
