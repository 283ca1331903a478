/*!
`serve.rs`

Runs the MCP server over stdio. This is what an MCP client launches; stdout
is reserved for the protocol, so everything human-facing goes to stderr
through `tracing`.
*/

use anyhow::{Context, Result};
use clap::Args;
use rmcp::ServiceExt;
use std::path::PathBuf;

use crate::config::{CliOverrides, Settings};
use crate::mcp::CursorToolsServer;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Config file (JSON, or YAML by extension)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Initial working directory for cursor-tools commands
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Kill a command after this many seconds (0 = no limit)
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl From<&ServeArgs> for CliOverrides {
    fn from(a: &ServeArgs) -> Self {
        CliOverrides {
            config: a.config.clone(),
            workdir: a.workdir.clone(),
            timeout_secs: a.timeout_secs,
        }
    }
}

pub async fn execute_serve(args: ServeArgs) -> Result<()> {
    let settings = Settings::load(&CliOverrides::from(&args))?;
    tracing::info!(
        executable = %settings.executable,
        workdir = %settings.working_directory.display(),
        timeout_secs = settings.timeout.map(|t| t.as_secs()),
        "starting MCP server on stdio"
    );

    let service = CursorToolsServer::new(settings)
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP session on stdio")?;
    let reason = service.waiting().await.context("MCP session failed")?;
    tracing::info!(?reason, "MCP session closed");
    Ok(())
}
