//! Tools that never launch the CLI: working-directory control and echo.

use rmcp::schemars;
use serde::Deserialize;

use crate::workdir::WorkingDirectory;

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SetWorkingDirectoryRequest {
    /// Absolute path, or a path relative to the current working directory
    pub directory_path: String,
}

/// Commit a new working directory, or explain why not. The previous value
/// is kept on failure.
pub fn set_working_directory(workdir: &WorkingDirectory, req: &SetWorkingDirectoryRequest) -> String {
    match workdir.set(&req.directory_path) {
        Ok(path) => format!("Working directory set to: {}", path.display()),
        Err(e) => {
            tracing::debug!(input = %req.directory_path, error = %e, "rejected working directory");
            format!("Error: {} is not a valid directory", req.directory_path)
        }
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct TestRequest {
    /// Message to echo back
    pub message: String,
}

pub fn echo(req: &TestRequest) -> String {
    format!("Echo: {}", req.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_valid_directory_reports_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("proj")).unwrap();
        let wd = WorkingDirectory::new(dir.path());

        let msg = set_working_directory(
            &wd,
            &SetWorkingDirectoryRequest {
                directory_path: "proj".into(),
            },
        );
        assert_eq!(
            msg,
            format!("Working directory set to: {}", wd.current().display())
        );
        assert!(wd.current().ends_with("proj"));
    }

    #[test]
    fn set_invalid_directory_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let wd = WorkingDirectory::new(dir.path());
        let before = wd.current();

        let msg = set_working_directory(
            &wd,
            &SetWorkingDirectoryRequest {
                directory_path: "nope".into(),
            },
        );
        assert_eq!(msg, "Error: nope is not a valid directory");
        assert_eq!(wd.current(), before);
    }

    #[test]
    fn echo_prefixes_message() {
        assert_eq!(
            echo(&TestRequest {
                message: "hello".into()
            }),
            "Echo: hello"
        );
    }
}
