use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{PyletError, Result};
use crate::exec::{ExecutionResult, ExitStatus, Launcher};

/// Exit code reported when the OS provides none (child killed by a signal).
const SIGNALED_EXIT_CODE: i32 = -1;

/// Runs a materialized script as `<interpreter> <script>` with the workspace
/// root as working directory, so the script can read and write sibling
/// workspace files.
///
/// On Unix the child is spawned as its own process group leader, so deadline
/// enforcement kills everything the script spawned, not just the interpreter.
///
/// Stdout and stderr are captured as complete in-memory buffers; output is
/// assumed to fit in memory, no size cap is applied.
pub struct InterpreterLauncher {
    interpreter: String,
    workdir: PathBuf,
}

impl InterpreterLauncher {
    pub fn new(interpreter: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            workdir: workdir.into(),
        }
    }

    /// Check whether the configured interpreter can be invoked at all.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.interpreter)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl Launcher for InterpreterLauncher {
    async fn run(&self, script: &Path, timeout: Duration) -> Result<ExecutionResult> {
        debug!(
            script = %script.display(),
            timeout_secs = timeout.as_secs(),
            "Launching script"
        );

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(script)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        {
            // New process group so the whole tree can be signalled at once
            cmd.process_group(0);
        }

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|e| PyletError::Launch {
            interpreter: self.interpreter.clone(),
            source: e,
        })?;

        let mut stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| PyletError::Io(std::io::Error::other("child stdout not captured")))?;
        let mut stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| PyletError::Io(std::io::Error::other("child stderr not captured")))?;

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        // Drain both streams while waiting, so a chatty child cannot block on
        // a full pipe before the deadline is checked.
        let wait = async {
            tokio::try_join!(
                stdout_pipe.read_to_end(&mut stdout_buf),
                stderr_pipe.read_to_end(&mut stderr_buf),
                child.wait(),
            )
        };

        let status = match tokio::time::timeout(timeout, wait).await {
            Ok(Ok((_, _, status))) => {
                ExitStatus::Exited(status.code().unwrap_or(SIGNALED_EXIT_CODE))
            }
            Ok(Err(e)) => {
                // Stream capture or wait failed; kill the tree and reap so
                // nothing outlives the request.
                kill_process_tree(&mut child).await;
                return Err(e.into());
            }
            Err(_) => {
                kill_process_tree(&mut child).await;
                warn!(
                    script = %script.display(),
                    timeout_secs = timeout.as_secs(),
                    "Script timed out and was killed"
                );
                ExitStatus::TimedOut
            }
        };

        let elapsed = started.elapsed();
        let stdout = String::from_utf8_lossy(&stdout_buf).to_string();
        let stderr = String::from_utf8_lossy(&stderr_buf).to_string();

        debug!(
            status = ?status,
            elapsed_secs = elapsed.as_secs_f64(),
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            "Script completed"
        );

        Ok(ExecutionResult {
            stdout,
            stderr,
            status,
            elapsed,
        })
    }
}

/// Kill the child's entire process group, then reap the direct child.
///
/// The child was spawned as its own group leader, so its pid doubles as the
/// group id and a single `killpg` reaches every descendant the script
/// spawned. `kill()` afterwards reaps the interpreter itself so no zombie is
/// left in the process table.
async fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        if unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) } != 0 {
            debug!(pid = pid, "Process group already gone or not signalable");
        }
    }

    if let Err(e) = child.kill().await {
        warn!(error = %e, "Failed to kill child process");
    }
}
