//! Third-party integrations: YouTube, GitHub, ClickUp, MCP marketplace.

use rmcp::schemars;
use serde::Deserialize;

use super::{CliTool, SAVE_TO, assemble, base};
use crate::args::Params;
use crate::runner::Invocation;
use crate::workdir::WorkingDirectory;

/* ---- YouTube ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum YoutubeReport {
    Summary,
    Transcript,
    Plan,
    Review,
    Custom,
}

impl YoutubeReport {
    pub fn as_str(&self) -> &'static str {
        match self {
            YoutubeReport::Summary => "summary",
            YoutubeReport::Transcript => "transcript",
            YoutubeReport::Plan => "plan",
            YoutubeReport::Review => "review",
            YoutubeReport::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct YoutubeRequest {
    /// Video URL
    pub url: String,
    /// Optional question about the video
    pub query: Option<String>,
    /// Kind of report to produce
    #[serde(rename = "type")]
    pub report: Option<YoutubeReport>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

impl CliTool for YoutubeRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let mut command = base(exe, &["youtube", self.url.as_str()]);
        if let Some(q) = self.query.as_deref().filter(|q| !q.is_empty()) {
            command.push(q.to_string());
        }
        let params = Params::new()
            .with("type", self.report.map(|r| r.as_str()))
            .with("save_to", self.save_to.as_deref());
        assemble(command, &params, &SAVE_TO, workdir)
    }
}

/* ---- GitHub ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GithubKind {
    Pr,
    Issue,
}

impl GithubKind {
    fn as_str(self) -> &'static str {
        match self {
            GithubKind::Pr => "pr",
            GithubKind::Issue => "issue",
        }
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GithubRequest {
    /// Number of a specific PR or issue; the last 10 are listed when omitted
    pub number: Option<i64>,
    /// Repository as owner/repo
    pub from_github: Option<String>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

impl GithubRequest {
    pub fn invocation_for(
        &self,
        kind: GithubKind,
        exe: &str,
        workdir: &WorkingDirectory,
    ) -> Invocation {
        let mut command = base(exe, &["github", kind.as_str()]);
        if let Some(n) = self.number {
            command.push(n.to_string());
        }
        let params = Params::new()
            .with("from_github", self.from_github.as_deref())
            .with("save_to", self.save_to.as_deref());
        assemble(command, &params, &SAVE_TO, workdir)
    }
}

/// `github pr` / `github issue` share one request shape.
pub struct Github<'a> {
    pub kind: GithubKind,
    pub request: &'a GithubRequest,
}

impl CliTool for Github<'_> {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        self.request.invocation_for(self.kind, exe, workdir)
    }
}

/* ---- ClickUp ---- */

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ClickupTaskRequest {
    /// ClickUp task id
    pub task_id: String,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

impl CliTool for ClickupTaskRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let params = Params::new().with("save_to", self.save_to.as_deref());
        assemble(
            base(exe, &["clickup", "task", self.task_id.as_str()]),
            &params,
            &SAVE_TO,
            workdir,
        )
    }
}

/* ---- MCP marketplace ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum McpProvider {
    Anthropic,
    Openrouter,
}

impl McpProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            McpProvider::Anthropic => "anthropic",
            McpProvider::Openrouter => "openrouter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpAction {
    Search,
    Run,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct McpRequest {
    /// Search terms, or a natural-language instruction for `mcp_run`
    pub query: String,
    /// Provider used to interpret the query
    pub provider: Option<McpProvider>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

/// `mcp search` / `mcp run` share one request shape.
pub struct Mcp<'a> {
    pub action: McpAction,
    pub request: &'a McpRequest,
}

impl CliTool for Mcp<'_> {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let action = match self.action {
            McpAction::Search => "search",
            McpAction::Run => "run",
        };
        let params = Params::new()
            .with("provider", self.request.provider.map(|p| p.as_str()))
            .with("save_to", self.request.save_to.as_deref());
        assemble(
            base(exe, &["mcp", action, self.request.query.as_str()]),
            &params,
            &SAVE_TO,
            workdir,
        )
    }
}
