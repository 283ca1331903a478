/*!
Working directory shared by every tool invocation.

One handle, cloned into the server. Reads happen on every path resolution
and process launch; writes only through `set`, which validates before
committing so a bad path leaves the previous value in place.
*/

use parking_lot::RwLock;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkdirError {
    #[error("{0} does not exist")]
    NotFound(PathBuf),
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct WorkingDirectory {
    inner: Arc<RwLock<PathBuf>>,
}

impl WorkingDirectory {
    /// Create a handle. A relative `initial` is taken against the process cwd.
    pub fn new(initial: impl AsRef<Path>) -> Self {
        let initial = initial.as_ref();
        let absolute = if initial.is_absolute() {
            normalize(initial)
        } else {
            let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
            normalize(&base.join(initial))
        };
        Self {
            inner: Arc::new(RwLock::new(absolute)),
        }
    }

    pub fn current(&self) -> PathBuf {
        self.inner.read().clone()
    }

    /// Join `value` onto the current directory and normalize `.` / `..`.
    /// An absolute `value` replaces the base.
    pub fn resolve(&self, value: impl AsRef<Path>) -> PathBuf {
        normalize(&self.inner.read().join(value))
    }

    /// Validate and commit a new directory, returning the stored path.
    pub fn set(&self, input: impl AsRef<Path>) -> Result<PathBuf, WorkdirError> {
        let candidate = self.resolve(input);
        let meta = std::fs::metadata(&candidate)
            .map_err(|_| WorkdirError::NotFound(candidate.clone()))?;
        if !meta.is_dir() {
            return Err(WorkdirError::NotADirectory(candidate));
        }

        let mut guard = self.inner.write();
        tracing::info!(from = %guard.display(), to = %candidate.display(), "working directory changed");
        *guard = candidate.clone();
        Ok(candidate)
    }
}

/// Lexical normalization: drops `.`, folds `..` into its parent. Symlinks are
/// not followed.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root is the root.
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
