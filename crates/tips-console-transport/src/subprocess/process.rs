//! Process management for the console subprocess

use crate::error::{Result, TransportError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

/// Configuration for spawning a console process
#[derive(Clone, Debug)]
pub struct ProcessConfig {
    /// Path to the console executable
    pub program: String,

    /// Arguments to pass to the console
    pub args: Vec<String>,

    /// Environment variables to set
    pub env: HashMap<String, String>,

    /// Start the child with an empty environment plus `env`
    pub clear_env: bool,

    /// Working directory of the child
    pub current_dir: Option<PathBuf>,

    /// How long each termination step waits for the child to exit
    pub terminate_timeout: Duration,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::new("tips-console")
    }
}

impl ProcessConfig {
    /// Create a new process configuration
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            clear_env: false,
            current_dir: None,
            terminate_timeout: Duration::from_secs(5),
        }
    }

    /// Build from a full command line: program followed by its arguments
    ///
    /// Returns `None` for an empty command line.
    pub fn from_command_line<I, S>(command_line: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = command_line.into_iter().map(Into::into);
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts))
    }

    /// Add an argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Do not inherit the parent's environment
    ///
    /// Only the variables set with [`ProcessConfig::with_env`] reach the child.
    pub fn with_clear_env(mut self, clear: bool) -> Self {
        self.clear_env = clear;
        self
    }

    /// Set the working directory
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set the per-step termination timeout
    pub fn with_terminate_timeout(mut self, timeout: Duration) -> Self {
        self.terminate_timeout = timeout;
        self
    }
}

/// Handle to a running console process
///
/// The child is killed when the handle is dropped.
pub struct ProcessHandle {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    config: ProcessConfig,
}

impl ProcessHandle {
    /// Spawn a new console process with stdin, stdout and stderr piped
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: ProcessConfig) -> Result<Self> {
        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args);

        if config.clear_env {
            cmd.env_clear();
        }
        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &config.current_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| TransportError::Spawn {
            program: config.program.clone(),
            source,
        })?;

        info!(
            program = %config.program,
            args = ?config.args,
            pid = child.id(),
            "Spawned console process"
        );

        Ok(Self {
            stdin: child.stdin.take(),
            stdout: child.stdout.take(),
            stderr: child.stderr.take(),
            child,
            config,
        })
    }

    /// Take the writable end of the child's stdin
    pub fn take_stdin(&mut self) -> Result<ChildStdin> {
        self.stdin.take().ok_or(TransportError::MissingPipe("stdin"))
    }

    /// Take the readable end of the child's stdout
    pub fn take_stdout(&mut self) -> Result<ChildStdout> {
        self.stdout.take().ok_or(TransportError::MissingPipe("stdout"))
    }

    /// Take the readable end of the child's stderr
    pub fn take_stderr(&mut self) -> Result<ChildStderr> {
        self.stderr.take().ok_or(TransportError::MissingPipe("stderr"))
    }

    /// OS process id, `None` once the child has been reaped
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Check if the process is still alive
    pub fn is_alive(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }

    /// Wait for the process to exit on its own
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        drop(self.stdin.take());
        Ok(self.child.wait().await?)
    }

    /// Bring the process down, escalating until it exits
    ///
    /// Closes stdin if it has not been taken, waits `terminate_timeout`, sends
    /// SIGTERM (unix) and waits again, then kills.
    pub async fn terminate(&mut self) -> Result<ExitStatus> {
        let grace = self.config.terminate_timeout;
        drop(self.stdin.take());

        if let Ok(status) = tokio::time::timeout(grace, self.child.wait()).await {
            let status = status?;
            debug!(?status, "Console exited after stdin closed");
            return Ok(status);
        }

        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            warn!(pid, "Console still running, sending SIGTERM");
            match send_sigterm(pid) {
                Ok(()) => {
                    if let Ok(status) = tokio::time::timeout(grace, self.child.wait()).await {
                        return Ok(status?);
                    }
                }
                Err(e) => warn!(pid, error = %e, "Failed to send SIGTERM"),
            }
        }

        warn!(pid = self.child.id(), "Timeout waiting for console to exit, killing");
        self.kill().await?;
        Ok(self.child.wait().await?)
    }

    /// Kill the process immediately
    pub async fn kill(&mut self) -> Result<()> {
        self.child.kill().await.map_err(TransportError::from)
    }

    /// Get the process configuration
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.child.id())
            .field("program", &self.config.program)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn send_sigterm(pid: u32) -> Result<()> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let pid = i32::try_from(pid).map_err(|e| TransportError::Signal(e.to_string()))?;
    kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(|e| TransportError::Signal(e.to_string()))
}
