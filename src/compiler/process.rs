//! Child process execution with concurrent output capture
//!
//! stdout and stderr are drained by two independent tasks while the caller
//! waits for exit, so a tool writing heavily to both pipes can never block on
//! a full buffer.

use super::params::CompilerInvocation;
use crate::error::{BuildError, Result};
use std::io;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything a finished tool run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `-1` when the process was terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches tools; each run owns its own buffers
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    cancel: Option<CancellationToken>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancelling `token` kills a running child and fails the run with
    /// [`BuildError::Cancelled`]
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
        }
    }

    pub async fn run(&self, invocation: &CompilerInvocation) -> Result<ProcessOutput> {
        let start = Instant::now();
        let launch_error = |source: io::Error| BuildError::Launch {
            executable: invocation.executable.clone(),
            args: invocation.command_line.clone(),
            source,
        };

        if self.is_cancelled() {
            return Err(BuildError::Cancelled);
        }

        debug!(command = %invocation, "Launching tool");

        let mut child = Command::new(&invocation.executable)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(launch_error)?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(launch_error(io::Error::new(
                io::ErrorKind::Other,
                "child output pipes were not captured",
            )));
        };

        let stdout_reader = tokio::spawn(drain(stdout));
        let stderr_reader = tokio::spawn(drain(stderr));
        let readers = [stdout_reader.abort_handle(), stderr_reader.abort_handle()];

        // a grandchild may keep the pipes open after the child exits, so the
        // readers are joined under the same cancellation as the wait
        let outcome = {
            let completion = async {
                let status = child.wait().await;
                let (stdout, stderr) = tokio::join!(collect(stdout_reader), collect(stderr_reader));
                (status, stdout, stderr)
            };

            match &self.cancel {
                Some(token) => tokio::select! {
                    finished = completion => Some(finished),
                    _ = token.cancelled() => None,
                },
                None => Some(completion.await),
            }
        };

        let Some((status, stdout, stderr)) = outcome else {
            warn!(executable = %invocation.executable.display(), "Cancelling tool run");
            if let Err(e) = child.kill().await {
                debug!(error = %e, "Tool had already exited");
            }
            for reader in &readers {
                reader.abort();
            }
            return Err(BuildError::Cancelled);
        };

        let output = ProcessOutput {
            exit_code: status.map_err(launch_error)?.code().unwrap_or(-1),
            stdout: stdout.map_err(launch_error)?,
            stderr: stderr.map_err(launch_error)?,
        };

        info!(
            executable = %invocation.executable.display(),
            exit_code = output.exit_code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            run_time_ms = start.elapsed().as_millis() as u64,
            "Tool run finished"
        );

        Ok(output)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, CancellationToken::is_cancelled)
    }
}

async fn drain<R>(mut reader: R) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).replace("\r\n", "\n"))
}

async fn collect(handle: JoinHandle<io::Result<String>>) -> io::Result<String> {
    handle
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}
