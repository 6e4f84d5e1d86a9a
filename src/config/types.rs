use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PyletConfig {
    pub workspace: WorkspaceConfig,
    pub runner: RunnerConfig,
}

/// Where scripts are materialized and executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace root directory. Defaults to the current directory when unset.
    pub root: Option<PathBuf>,
    /// Name of the scratch subdirectory that holds materialized scripts.
    pub scratch_dir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: None,
            scratch_dir: "scratch".to_string(),
        }
    }
}

/// How scripts are launched and bounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Interpreter used to launch materialized scripts.
    pub interpreter: String,
    /// Timeout applied when a request does not specify one.
    pub default_timeout_seconds: u64,
    /// Hard cap; requested timeouts above this are clamped down to it.
    pub max_timeout_seconds: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            default_timeout_seconds: 30,
            max_timeout_seconds: 120,
        }
    }
}
