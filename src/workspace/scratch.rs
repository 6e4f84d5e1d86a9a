use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::error::{PyletError, Result};
use crate::workspace::Workspace;

/// File extension every materialized script carries.
const SCRIPT_EXT: &str = "py";

/// A script file written into the workspace scratch directory.
///
/// Scratch files persist after the request that created them returns. The
/// scratch directory is an append-only record of past executions, kept for
/// post-hoc inspection; nothing in this crate deletes it.
#[derive(Debug, Clone)]
pub struct ScratchFile {
    /// Absolute path of the materialized script.
    pub path: PathBuf,
    /// Resolved file name, always ending in `.py`.
    pub file_name: String,
}

impl Workspace {
    /// Write `code` to a confinement-checked file under the scratch directory.
    ///
    /// A missing `filename` gets a generated uuid-based name; a supplied one
    /// gets `.py` appended when absent. Names are validated before anything
    /// touches the filesystem: a name that would resolve outside the scratch
    /// directory fails with `InvalidName` and writes nothing.
    ///
    /// Overwrite is permitted. Two concurrent requests that pick the same
    /// explicit filename race with last-write-wins semantics; callers that
    /// need concurrency safety should omit the filename and rely on the
    /// generated unique names.
    pub async fn materialize(&self, code: &str, filename: Option<&str>) -> Result<ScratchFile> {
        let file_name = resolve_file_name(filename)?;

        let scratch = self.scratch_path();
        fs::create_dir_all(&scratch).await?;

        let path = scratch.join(&file_name);
        fs::write(&path, code).await?;

        debug!(path = %path.display(), bytes = code.len(), "Materialized script");

        Ok(ScratchFile { path, file_name })
    }
}

/// Resolve and validate the script file name for a request.
fn resolve_file_name(filename: Option<&str>) -> Result<String> {
    let name = match filename {
        None => return Ok(format!("script_{}.{}", Uuid::new_v4().simple(), SCRIPT_EXT)),
        Some(name) => name.trim(),
    };

    if name.is_empty() {
        return Err(PyletError::InvalidName {
            name: name.to_string(),
            reason: "name is empty".to_string(),
        });
    }

    // Confinement check: the name must be a single plain path component.
    // Separators, parent-directory segments, and rooted paths would resolve
    // outside the scratch directory.
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => {
            return Err(PyletError::InvalidName {
                name: name.to_string(),
                reason: "must be a plain file name inside the scratch directory".to_string(),
            })
        }
    }

    let has_ext = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(SCRIPT_EXT))
        .unwrap_or(false);

    if has_ext {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.{}", name, SCRIPT_EXT))
    }
}
