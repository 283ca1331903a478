use anyhow::Result;
use clap::{Parser, Subcommand};

mod args;
mod cmd;
mod config;
mod mcp;
mod runner;
mod tools;
mod utils;
mod workdir;

use cmd::{CallArgs, ListArgs, ServeArgs};

/// MCP server exposing the cursor-tools CLI as tools.
///
/// Command layout:
///   cursor-tools-mcp [serve] [--workdir DIR] [--config FILE] [--timeout-secs N]
///   cursor-tools-mcp list [-t "<target>"] [--json]
///   cursor-tools-mcp call <TOOL> [--param k=v ...] [--param-file F] [-t "<target>"] [--json]
///
/// Global flags / env:
///   -v / -vv        Increase verbosity (stderr)
///   -q / --quiet    Errors only
///   RUST_LOG        Overrides the level derived from -v / -q
///   MCP_TARGET      Server command line for list / call when -t is absent
///   VIBE_TOOLS_PATH / CURSOR_TOOLS_PATH
///                   Path to the cursor-tools executable
///
/// Examples:
///   cursor-tools-mcp --workdir ~/src/app
///   cursor-tools-mcp list
///   cursor-tools-mcp call ask --param query="what is MCP?" --param provider=openai
#[derive(Parser, Debug)]
#[command(
    name = "cursor-tools-mcp",
    version,
    author,
    about = "MCP server wrapping the cursor-tools CLI",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve MCP over stdio (default)
    Serve(ServeArgs),

    /// List the tools a server exposes
    List(ListArgs),

    /// Invoke one tool and print its result
    Call(CallArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    match cli.command.unwrap_or_else(|| Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => cmd::execute_serve(args).await,
        Commands::List(args) => cmd::execute_list(args).await,
        Commands::Call(args) => cmd::execute_call(args).await,
    }
}
