/*!
Tool catalogue: one request type per remote operation, each knowing how to
turn itself into a cursor-tools argv.

Layout:
  llm.rs          ask / plan / web / repo / doc
  integrations.rs youtube / github pr+issue / clickup / mcp search+run
  browser.rs      browser open / act / observe / extract
  xcode.rs        xcode build / run / lint
  workspace.rs    set_working_directory / test (no child process)

Every mapping is pure apart from reading the working directory for path
parameters.
*/

pub mod browser;
pub mod integrations;
pub mod llm;
pub mod workspace;
pub mod xcode;

use crate::args::{ArgClasses, Params, build_command_args};
use crate::runner::Invocation;
use crate::workdir::WorkingDirectory;

/// A request that runs the external CLI.
pub trait CliTool {
    /// Reject malformed input before anything is launched. The message is
    /// returned to the caller verbatim.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation;
}

/// `exe` followed by fixed subcommand tokens.
pub(crate) fn base(exe: &str, tokens: &[&str]) -> Vec<String> {
    std::iter::once(exe)
        .chain(tokens.iter().copied())
        .map(str::to_string)
        .collect()
}

pub(crate) fn assemble(
    base: Vec<String>,
    params: &Params,
    classes: &ArgClasses,
    workdir: &WorkingDirectory,
) -> Invocation {
    Invocation::new(build_command_args(&base, params, classes, workdir))
}

/// Only `save_to` is a path; shared by most tools.
pub(crate) const SAVE_TO: ArgClasses = ArgClasses::paths(&["save_to"]);
