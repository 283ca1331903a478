//! MCP plumbing.
//!
//! server  -> CursorToolsServer (tool router + ServerHandler)
//! sink    -> McpSink (runner events as MCP notifications)
//! here    -> target parsing + client connect for the `list` / `call` subcommands
//!
use anyhow::{Context, Result, bail};
use rmcp::service::RunningService;
use rmcp::{RoleClient, ServiceExt};
use shell_words::split as shell_split;
use std::fmt;
use tokio::process::Command;
use url::Url;

pub mod server;
pub mod sink;

pub use server::CursorToolsServer;

/// A local MCP server command line, parsed from a `--target` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub original: String,
    pub program: String,
    pub args: Vec<String>,
}

impl TargetSpec {
    /// This executable in `serve` mode; the default for `list` / `call`.
    pub fn current_exe() -> Result<Self> {
        let exe = std::env::current_exe().context("Failed to locate current executable")?;
        let program = exe.to_string_lossy().into_owned();
        Ok(Self {
            original: format!("{program} serve"),
            program,
            args: vec!["serve".to_string()],
        })
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "local: {}", self.program)
        } else {
            write!(f, "local: {} {}", self.program, self.args.join(" "))
        }
    }
}

/// Parse a `--target` value into a local command.
///
/// The value is split with shell rules. Remote endpoints (http/https/ws/wss)
/// are recognised and rejected; other URL-looking strings are treated as
/// commands.
pub fn parse_target(raw: &str) -> Result<TargetSpec> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Target string is empty");
    }

    if let Ok(url) = Url::parse(trimmed)
        && matches!(url.scheme(), "http" | "https" | "ws" | "wss")
    {
        bail!("Remote targets are not supported: {url}");
    }

    let parts =
        shell_split(trimmed).context("Failed to parse local command line (shell splitting)")?;
    let Some((program, args)) = parts.split_first() else {
        bail!("No tokens produced when parsing local command target");
    };
    if program.is_empty() {
        bail!("Empty program name in local command target");
    }
    Ok(TargetSpec {
        original: raw.to_string(),
        program: program.clone(),
        args: args.to_vec(),
    })
}

/// Spawn the target and complete the MCP handshake. Child stderr is dropped
/// so server logs do not interleave with CLI output.
pub async fn connect(spec: &TargetSpec) -> Result<RunningService<RoleClient, ()>> {
    use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};

    let transport = TokioChildProcess::new(Command::new(&spec.program).configure(|c| {
        c.args(&spec.args);
        c.stderr(std::process::Stdio::null());
    }))
    .with_context(|| format!("Failed to spawn MCP process: {spec}"))?;

    let service = ()
        .serve(transport)
        .await
        .with_context(|| format!("Failed to initialize MCP session: {spec}"))?;
    tracing::debug!(target_cmd = %spec, "connected");
    Ok(service)
}
