mod scratch;

pub use scratch::ScratchFile;

use std::path::{Path, PathBuf};

use crate::config::WorkspaceConfig;
use crate::error::{PyletError, Result};

/// The caller-designated root directory within which all scratch files and
/// script side effects are confined.
///
/// The root is resolved once, at service construction, from explicit
/// configuration. It is never read from ambient process state afterwards, so
/// multiple independently configured workspaces can coexist in one process.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    scratch_dir: String,
}

impl Workspace {
    /// Resolve the workspace root from configuration.
    ///
    /// Uses the configured root when set, otherwise the current directory.
    /// Relative roots are normalized against the current directory. Failure
    /// here is fatal to the whole service, not a per-request condition.
    pub fn resolve(config: &WorkspaceConfig) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| PyletError::WorkspaceResolve {
            reason: format!("cannot determine current directory: {}", e),
        })?;

        let root = match &config.root {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => cwd.join(path),
            None => cwd,
        };

        if !root.is_absolute() {
            return Err(PyletError::WorkspaceResolve {
                reason: format!("'{}' is not an absolute path", root.display()),
            });
        }

        Ok(Self {
            root,
            scratch_dir: config.scratch_dir.clone(),
        })
    }

    /// Absolute workspace root. Scripts execute with this as their working
    /// directory so they can read and write sibling workspace files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the scratch subdirectory holding materialized scripts.
    pub fn scratch_path(&self) -> PathBuf {
        self.root.join(&self.scratch_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_is_current_dir() {
        let workspace = Workspace::resolve(&WorkspaceConfig::default()).unwrap();
        assert_eq!(workspace.root(), std::env::current_dir().unwrap());
        assert!(workspace.root().is_absolute());
    }

    #[test]
    fn explicit_absolute_root_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkspaceConfig {
            root: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let workspace = Workspace::resolve(&config).unwrap();
        assert_eq!(workspace.root(), dir.path());
    }

    #[test]
    fn relative_root_is_normalized() {
        let config = WorkspaceConfig {
            root: Some("some/relative/dir".into()),
            ..Default::default()
        };
        let workspace = Workspace::resolve(&config).unwrap();
        assert!(workspace.root().is_absolute());
        assert!(workspace.root().ends_with("some/relative/dir"));
    }

    #[test]
    fn scratch_path_is_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkspaceConfig {
            root: Some(dir.path().to_path_buf()),
            scratch_dir: "scratch".to_string(),
        };
        let workspace = Workspace::resolve(&config).unwrap();
        assert_eq!(workspace.scratch_path(), dir.path().join("scratch"));
    }
}
