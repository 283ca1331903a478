//! Xcode commands: build, run, lint.

use rmcp::schemars;
use serde::Deserialize;

use super::{CliTool, SAVE_TO, assemble, base};
use crate::args::{ArgClasses, Params};
use crate::runner::Invocation;
use crate::workdir::WorkingDirectory;

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct XcodeBuildRequest {
    /// Custom build output path, relative to the working directory
    pub build_path: Option<String>,
    /// Build destination; defaults to the iOS Simulator
    pub destination: Option<String>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

const BUILD_CLASSES: ArgClasses = ArgClasses::paths(&["build_path", "save_to"]);

impl CliTool for XcodeBuildRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let params = Params::new()
            .with("build_path", self.build_path.as_deref())
            .with("destination", self.destination.as_deref())
            .with("save_to", self.save_to.as_deref());
        assemble(base(exe, &["xcode", "build"]), &params, &BUILD_CLASSES, workdir)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct XcodeRunRequest {
    /// Simulator destination; defaults to the iOS Simulator
    pub destination: Option<String>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

impl CliTool for XcodeRunRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let params = Params::new()
            .with("destination", self.destination.as_deref())
            .with("save_to", self.save_to.as_deref());
        assemble(base(exe, &["xcode", "run"]), &params, &SAVE_TO, workdir)
    }
}

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct XcodeLintRequest {
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

impl CliTool for XcodeLintRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let params = Params::new().with("save_to", self.save_to.as_deref());
        assemble(base(exe, &["xcode", "lint"]), &params, &SAVE_TO, workdir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::wd;

    #[test]
    fn build_resolves_build_path() {
        let req = XcodeBuildRequest {
            build_path: Some("build/out".into()),
            destination: Some("platform=iOS Simulator,name=iPhone 15".into()),
            save_to: None,
        };
        assert_eq!(
            req.invocation("ct", &wd()).args,
            vec![
                "ct",
                "xcode",
                "build",
                "--build-path=/cwd/build/out",
                "--destination=\"platform=iOS Simulator,name=iPhone 15\""
            ]
        );
    }

    #[test]
    fn run_without_options() {
        let req = XcodeRunRequest {
            destination: None,
            save_to: None,
        };
        assert_eq!(req.invocation("ct", &wd()).args, vec!["ct", "xcode", "run"]);
    }

    #[test]
    fn lint_saves_relative_to_working_directory() {
        let req = XcodeLintRequest {
            save_to: Some("lint.txt".into()),
        };
        assert_eq!(
            req.invocation("ct", &wd()).args,
            vec!["ct", "xcode", "lint", "--save-to=/cwd/lint.txt"]
        );
    }
}
