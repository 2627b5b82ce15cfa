//! Errors and path helpers shared by the pipeline stages

use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::config::ConfigError;
use crate::games::GamePathError;

use super::TaskContext;

// ============================================================================
// Shared Installation Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("download of {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    IntegrityMismatch { expected: u64, actual: u64 },

    #[error("corrupt archive {}: {reason}", path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("copy source missing: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("path '{0}' escapes its root")]
    PathEscape(String),

    #[error("installation cancelled by user")]
    Cancelled,

    #[error("no game path configured")]
    NoGamePath,

    #[error(transparent)]
    GamePath(#[from] GamePathError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    /// Wrap an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> InstallError {
        let context = context.into();
        move |source| InstallError::Io { context, source }
    }
}

pub fn check_cancelled(ctx: &TaskContext) -> Result<(), InstallError> {
    if ctx.is_cancelled() {
        Err(InstallError::Cancelled)
    } else {
        Ok(())
    }
}

// ============================================================================
// Path Containment
// ============================================================================

/// Join a relative path onto `root`, refusing anything that would resolve
/// outside it. `..` is allowed as long as it never climbs above `root`.
pub fn contained_join(root: &Path, relative: &str) -> Result<PathBuf, InstallError> {
    let escape = || InstallError::PathEscape(relative.to_string());
    let mut joined = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                joined.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(escape());
                }
                joined.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return Err(escape()),
        }
    }
    Ok(joined)
}

/// Like [`contained_join`] but the result must be strictly below `root`.
pub fn contained_child(root: &Path, relative: &str) -> Result<PathBuf, InstallError> {
    let joined = contained_join(root, relative)?;
    if joined == root {
        return Err(InstallError::PathEscape(relative.to_string()));
    }
    Ok(joined)
}
