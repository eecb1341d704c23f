//! Real process runner on tokio::process
//!
//! Spawns the child with the inherited environment plus the invocation's
//! overlay, routes stdout and stderr to the same destination, and waits for
//! the exit.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::config::K6Config;
use crate::error::{K6Error, K6Result};
use crate::invocation::{Invocation, OutputTarget};
use crate::traits::ProcessRunner;
use shared::{component_debug, component_info, component_warn, Component};

/// Real process runner implementation
#[derive(Clone, Debug, Default)]
pub struct RealProcessRunner {
    /// Kill the child after this long
    timeout: Option<Duration>,

    /// Report non-zero exit codes as failure
    fail_on_exit_code: bool,
}

impl RealProcessRunner {
    /// Create runner with no timeout that only reports spawn/wait problems
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &K6Config) -> Self {
        Self {
            timeout: config.timeout,
            fail_on_exit_code: config.fail_on_exit_code,
        }
    }

    /// Configure run timeout (fluent API)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure exit code handling (fluent API)
    pub fn with_fail_on_exit_code(mut self, fail_on_exit_code: bool) -> Self {
        self.fail_on_exit_code = fail_on_exit_code;
        self
    }

    /// A second handle on the parent's stdout, so child stderr lands there too
    #[cfg(unix)]
    fn parent_stdout() -> K6Result<Stdio> {
        use std::os::fd::AsFd;

        let fd = std::io::stdout()
            .as_fd()
            .try_clone_to_owned()
            .map_err(K6Error::Console)?;
        Ok(Stdio::from(fd))
    }

    #[cfg(windows)]
    fn parent_stdout() -> K6Result<Stdio> {
        use std::os::windows::io::AsHandle;

        let handle = std::io::stdout()
            .as_handle()
            .try_clone_to_owned()
            .map_err(K6Error::Console)?;
        Ok(Stdio::from(handle))
    }

    /// Route both child streams to `output`
    async fn configure_output(cmd: &mut Command, output: &OutputTarget) -> K6Result<()> {
        match output {
            OutputTarget::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Self::parent_stdout()?);
            }
            OutputTarget::Discard => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
            OutputTarget::File(path) => {
                let log_error = |source| K6Error::LogFile {
                    path: path.clone(),
                    source,
                };
                let stdout = tokio::fs::File::create(path)
                    .await
                    .map_err(log_error)?
                    .into_std()
                    .await;
                let stderr = stdout.try_clone().map_err(log_error)?;
                cmd.stdout(Stdio::from(stdout)).stderr(Stdio::from(stderr));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProcessRunner for RealProcessRunner {
    async fn run(&self, invocation: Invocation) -> K6Result<bool> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        Self::configure_output(&mut cmd, &invocation.output).await?;

        component_info!(Component::K6Driver, "Running Grafana k6 command: {}", invocation.command_line());

        let started = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| K6Error::driver_unavailable(&invocation.program, e))?;
        // The command still holds the parent's copies of the log file handles
        drop(cmd);

        component_debug!(Component::K6Driver, "Spawned {} (PID: {:?})", invocation.program, child.id());

        let status = match self.timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, child.wait()).await;
                match waited {
                    Ok(status) => status.map_err(K6Error::Wait)?,
                    Err(_) => {
                        component_warn!(
                            Component::K6Driver,
                            "k6 run exceeded {:?}, killing process",
                            limit
                        );
                        if let Err(e) = child.kill().await {
                            component_warn!(Component::K6Driver, error = %e, "Failed to kill k6 process");
                        }
                        return Ok(false);
                    }
                }
            }
            None => child.wait().await.map_err(K6Error::Wait)?,
        };

        let elapsed = started.elapsed();
        if status.success() {
            component_info!(Component::K6Driver, "k6 run completed in {:.1?}", elapsed);
            Ok(true)
        } else {
            component_warn!(
                Component::K6Driver,
                exit_code = ?status.code(),
                "k6 run exited unsuccessfully after {:.1?}",
                elapsed
            );
            Ok(!self.fail_on_exit_code)
        }
    }
}
