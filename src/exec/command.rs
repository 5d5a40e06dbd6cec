// src/exec/command.rs

//! Task body that runs a shell command.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::engine::TaskName;
use crate::exec::body::{BodyFuture, TaskBody};

/// Runs `cmd` through a shell, forwarding its output to the log.
///
/// - stdout lines are logged at `info`, stderr lines at `debug`.
/// - A non-zero exit status (or death by signal) fails the task.
#[derive(Debug, Clone)]
pub struct CommandBody {
    task: TaskName,
    cmd: String,
    shell: Option<String>,
    cwd: Option<PathBuf>,
}

impl CommandBody {
    pub fn new(task: impl Into<TaskName>, cmd: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            cmd: cmd.into(),
            shell: None,
            cwd: None,
        }
    }

    /// Use this shell instead of the platform default (`sh` / `cmd`).
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    fn build_command(&self) -> Command {
        let shell = match &self.shell {
            Some(shell) => shell.as_str(),
            None if cfg!(windows) => "cmd",
            None => "sh",
        };
        let flag = if shell.ends_with("cmd") || shell.ends_with("cmd.exe") {
            "/C"
        } else {
            "-c"
        };

        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(&self.cmd);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run_inner(&self) -> anyhow::Result<()> {
        info!(task = %self.task, cmd = %self.cmd, "starting task process");

        let mut child = self
            .build_command()
            .spawn()
            .with_context(|| format!("spawning process for task '{}'", self.task))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (status, (), ()) = tokio::join!(
            child.wait(),
            forward_lines(&self.task, stdout, false),
            forward_lines(&self.task, stderr, true),
        );

        let status =
            status.with_context(|| format!("waiting for process of task '{}'", self.task))?;

        info!(
            task = %self.task,
            exit_code = status.code().unwrap_or(-1),
            success = status.success(),
            "task process exited"
        );

        if !status.success() {
            match status.code() {
                Some(code) => bail!("command `{}` exited with status {}", self.cmd, code),
                None => bail!("command `{}` was terminated by a signal", self.cmd),
            }
        }

        Ok(())
    }
}

impl TaskBody for CommandBody {
    fn run(&self) -> BodyFuture<'_> {
        Box::pin(self.run_inner())
    }
}

/// Log every line of a child stream until EOF.
///
/// Lines are read as raw bytes and decoded lossily, so non-UTF-8 output
/// never stops the drain. The pipe stays open until the child closes it.
async fn forward_lines<R>(task: &str, stream: Option<R>, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return;
    };

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                if is_stderr {
                    debug!(task = %task, "stderr: {}", line);
                } else {
                    info!(task = %task, "stdout: {}", line);
                }
            }
            Err(err) => {
                debug!(task = %task, error = %err, "stopped reading task output");
                break;
            }
        }
    }
}
