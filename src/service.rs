use std::time::Duration;

use tracing::{error, info};

use crate::config::PyletConfig;
use crate::error::{PyletError, Result};
use crate::exec::{render, ExecutionResult, InterpreterLauncher, Launcher};
use crate::workspace::Workspace;

/// One execution request. Ephemeral: one per call, nothing shared across
/// requests beyond the workspace configuration held by the service.
#[derive(Debug, Clone, Default)]
pub struct ExecutionRequest {
    /// Source text to run as a script.
    pub code: String,
    /// Optional logical name; `.py` is appended when missing, a unique name
    /// is generated when absent.
    pub filename: Option<String>,
    /// Optional timeout in seconds. Missing values default to the configured
    /// default; values above the configured cap are silently clamped; zero
    /// or negative values are rejected as invalid input.
    pub timeout_seconds: Option<i64>,
}

/// The single entry point consumed by the surrounding dispatch layer.
///
/// Resolves the workspace once at construction (fail-fast) and then handles
/// each request as materialize, run, format, strictly in sequence. Requests
/// are independent; the filesystem is the only shared resource.
pub struct ExecutionService {
    workspace: Workspace,
    launcher: Box<dyn Launcher>,
    default_timeout_seconds: u64,
    max_timeout_seconds: u64,
}

impl ExecutionService {
    pub fn new(config: &PyletConfig) -> Result<Self> {
        let workspace = Workspace::resolve(&config.workspace)?;
        let launcher = Box::new(InterpreterLauncher::new(
            &config.runner.interpreter,
            workspace.root(),
        ));

        info!(
            root = %workspace.root().display(),
            interpreter = %config.runner.interpreter,
            "Execution service ready"
        );

        Ok(Self {
            workspace,
            launcher,
            default_timeout_seconds: config.runner.default_timeout_seconds,
            max_timeout_seconds: config.runner.max_timeout_seconds,
        })
    }

    /// Execute a request and always return text.
    ///
    /// Internal stages report typed errors; this outermost boundary renders
    /// any failure as best-effort diagnostic text, so the caller receives
    /// some textual result rather than an unhandled fault.
    pub async fn execute(&self, request: ExecutionRequest) -> String {
        match self.run(&request).await {
            Ok((result, timeout_secs)) => render(&result, timeout_secs),
            Err(e) => {
                error!(error = %e, "Execution request failed");
                format!("execution failed: {}", e)
            }
        }
    }

    /// Execute a request, returning the typed result plus the timeout that
    /// was in force. Callers that need structured fields (e.g. json output)
    /// use this; `execute` is the text rendering built on top of it.
    pub async fn run(&self, request: &ExecutionRequest) -> Result<(ExecutionResult, u64)> {
        let timeout_secs = self.effective_timeout(request.timeout_seconds)?;

        let script = self
            .workspace
            .materialize(&request.code, request.filename.as_deref())
            .await?;

        let result = self
            .launcher
            .run(&script.path, Duration::from_secs(timeout_secs))
            .await?;

        info!(
            file = %script.file_name,
            status = ?result.status,
            elapsed_secs = result.elapsed.as_secs_f64(),
            "Execution finished"
        );

        Ok((result, timeout_secs))
    }

    /// Clamp or reject the requested timeout.
    fn effective_timeout(&self, requested: Option<i64>) -> Result<u64> {
        match requested {
            None => Ok(self.default_timeout_seconds),
            Some(seconds) if seconds <= 0 => Err(PyletError::InvalidTimeout { seconds }),
            Some(seconds) => Ok((seconds as u64).min(self.max_timeout_seconds)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;
    use crate::exec::{ExecutionResult, ExitStatus, InterpreterLauncher};
    use async_trait::async_trait;
    use std::path::Path;

    /// Launcher stub so boundary behavior is testable without an interpreter.
    struct StaticLauncher {
        stdout: String,
        status: ExitStatus,
    }

    #[async_trait]
    impl Launcher for StaticLauncher {
        async fn run(&self, _script: &Path, _timeout: Duration) -> crate::Result<ExecutionResult> {
            Ok(ExecutionResult {
                stdout: self.stdout.clone(),
                stderr: String::new(),
                status: self.status,
                elapsed: Duration::from_millis(10),
            })
        }
    }

    fn service_in(root: &Path, launcher: Box<dyn Launcher>) -> ExecutionService {
        ExecutionService {
            workspace: Workspace::resolve(&WorkspaceConfig {
                root: Some(root.to_path_buf()),
                ..Default::default()
            })
            .unwrap(),
            launcher,
            default_timeout_seconds: 30,
            max_timeout_seconds: 120,
        }
    }

    fn stub_service(root: &Path) -> ExecutionService {
        service_in(
            root,
            Box::new(StaticLauncher {
                stdout: "ok\n".to_string(),
                status: ExitStatus::Exited(0),
            }),
        )
    }

    #[test]
    fn missing_timeout_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let service = stub_service(dir.path());
        assert_eq!(service.effective_timeout(None).unwrap(), 30);
    }

    #[test]
    fn oversized_timeout_is_clamped_to_cap() {
        let dir = tempfile::tempdir().unwrap();
        let service = stub_service(dir.path());
        assert_eq!(service.effective_timeout(Some(500)).unwrap(), 120);
        assert_eq!(service.effective_timeout(Some(120)).unwrap(), 120);
        assert_eq!(service.effective_timeout(Some(5)).unwrap(), 5);
    }

    #[test]
    fn zero_or_negative_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let service = stub_service(dir.path());
        for seconds in [0, -1, -120] {
            assert!(matches!(
                service.effective_timeout(Some(seconds)),
                Err(PyletError::InvalidTimeout { .. })
            ));
        }
    }

    #[tokio::test]
    async fn failures_are_rendered_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let service = stub_service(dir.path());

        let report = service
            .execute(ExecutionRequest {
                code: "print('x')".to_string(),
                filename: Some("../escape".to_string()),
                timeout_seconds: None,
            })
            .await;
        assert!(report.starts_with("execution failed:"));
        assert!(report.contains("Invalid script name"));

        let report = service
            .execute(ExecutionRequest {
                code: "print('x')".to_string(),
                filename: None,
                timeout_seconds: Some(0),
            })
            .await;
        assert!(report.starts_with("execution failed:"));
        assert!(report.contains("Invalid timeout"));
    }

    #[tokio::test]
    async fn typed_result_carries_status_and_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let service = stub_service(dir.path());

        let (result, timeout_secs) = service
            .run(&ExecutionRequest {
                code: "print('ok')".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result.status, ExitStatus::Exited(0));
        assert_eq!(result.stdout, "ok\n");
        assert_eq!(timeout_secs, 30);
    }

    #[tokio::test]
    async fn request_pipeline_produces_a_report() {
        let dir = tempfile::tempdir().unwrap();
        let service = stub_service(dir.path());

        let report = service
            .execute(ExecutionRequest {
                code: "print('ok')".to_string(),
                ..Default::default()
            })
            .await;

        assert!(report.contains("--- stdout ---\nok\n"));
        assert!(report.contains("exit code: 0"));
        assert!(report.contains("timeout limit: 30s"));
        // The scratch file persists after the call returns.
        assert!(dir.path().join("scratch").read_dir().unwrap().count() == 1);
    }

    #[tokio::test]
    async fn end_to_end_round_trip_with_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        if !InterpreterLauncher::new("python3", dir.path())
            .is_available()
            .await
        {
            return; // skip if python3 not available
        }

        let service = service_in(
            dir.path(),
            Box::new(InterpreterLauncher::new("python3", dir.path())),
        );

        let report = service
            .execute(ExecutionRequest {
                code: "print('hello-42')".to_string(),
                ..Default::default()
            })
            .await;
        assert!(report.contains("hello-42"));
        assert!(report.contains("exit code: 0"));

        let report = service
            .execute(ExecutionRequest {
                code: "pass".to_string(),
                ..Default::default()
            })
            .await;
        assert!(report.starts_with("(no output produced)"));
    }
}
