/*!
server.rs - the MCP tool surface.

Every CLI-backed tool follows the same path:
  request -> validate -> argv (tools::*) -> runner::run -> text result

Launch failures and non-zero exits come back as ordinary text results.
Only a fault while streaming (read error, cancellation, timeout) turns into
a protocol error.
*/

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, tool, tool_handler, tool_router};

use super::sink::McpSink;
use crate::config::Settings;
use crate::runner::{self, RunOptions, RunSink};
use crate::tools::CliTool;
use crate::tools::browser::{
    Browser, BrowserAction, BrowserInstructionRequest, BrowserOpenRequest,
};
use crate::tools::integrations::{
    ClickupTaskRequest, Github, GithubKind, GithubRequest, Mcp, McpAction, McpRequest,
    YoutubeRequest,
};
use crate::tools::llm::{AskRequest, DocRequest, PlanRequest, RepoRequest, WebRequest};
use crate::tools::workspace::{self, SetWorkingDirectoryRequest, TestRequest};
use crate::tools::xcode::{XcodeBuildRequest, XcodeLintRequest, XcodeRunRequest};
use crate::workdir::WorkingDirectory;

pub const SERVER_NAME: &str = "cursor-tools-mcp";

const INSTRUCTIONS: &str = "MCP server for the cursor-tools CLI. IMPORTANT: always set the \
working directory with set_working_directory before using any other tool. Command output \
is streamed as log notifications while it runs.";

#[derive(Clone)]
pub struct CursorToolsServer {
    settings: Arc<Settings>,
    workdir: WorkingDirectory,
    tool_router: ToolRouter<Self>,
}

impl CursorToolsServer {
    pub fn new(settings: Settings) -> Self {
        let workdir = WorkingDirectory::new(&settings.working_directory);
        Self {
            settings: Arc::new(settings),
            workdir,
            tool_router: Self::tool_router(),
        }
    }

    async fn execute<T: CliTool + Sync>(
        &self,
        tool: &T,
        ctx: &RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if let Err(message) = tool.validate() {
            return Ok(CallToolResult::error(vec![Content::text(message)]));
        }

        let invocation = tool.invocation(&self.settings.executable, &self.workdir);
        let sink = McpSink::from_context(ctx);
        let options = RunOptions {
            sink: Some(&sink),
            cancel: ctx.ct.clone(),
            timeout: self.settings.timeout,
        };

        match runner::run(invocation, &self.workdir, options).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => Err(McpError::internal_error(
                format!("command execution failed: {e}"),
                None,
            )),
        }
    }
}

#[tool_router]
impl CursorToolsServer {
    /* ---- meta ---- */

    #[tool(
        description = "Set the working directory for cursor-tools commands. Must be called at \
        least once before other tools; relative paths resolve against the current value."
    )]
    async fn set_working_directory(
        &self,
        Parameters(req): Parameters<SetWorkingDirectoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = workspace::set_working_directory(&self.workdir, &req);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(name = "test", description = "Simple echo test")]
    async fn echo_test(
        &self,
        Parameters(req): Parameters<TestRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        McpSink::from_context(&ctx)
            .info(&format!("Echo test: {}", req.message))
            .await;
        Ok(CallToolResult::success(vec![Content::text(workspace::echo(&req))]))
    }

    /* ---- llm ---- */

    #[tool(description = "Ask a direct question to an LLM without codebase context")]
    async fn ask(
        &self,
        Parameters(req): Parameters<AskRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    #[tool(
        description = "Generate a focused implementation plan; one model picks relevant files, \
        another writes the plan"
    )]
    async fn plan(
        &self,
        Parameters(req): Parameters<PlanRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    #[tool(description = "Get answers from the web using an AI model with search capabilities")]
    async fn web(
        &self,
        Parameters(req): Parameters<WebRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    #[tool(
        description = "Context-aware answers about the repository in the working directory, a \
        subdirectory of it, or a remote GitHub repository"
    )]
    async fn repo(
        &self,
        Parameters(req): Parameters<RepoRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    #[tool(description = "Generate documentation for a local or remote GitHub repository")]
    async fn doc(
        &self,
        Parameters(req): Parameters<DocRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    /* ---- integrations ---- */

    #[tool(
        description = "Analyze a YouTube video (summary, transcript, plan, review, custom). \
        Requires GEMINI_API_KEY."
    )]
    async fn youtube(
        &self,
        Parameters(req): Parameters<YoutubeRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    #[tool(description = "Get GitHub pull requests: the last 10, or one by number")]
    async fn github_pr(
        &self,
        Parameters(req): Parameters<GithubRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = Github {
            kind: GithubKind::Pr,
            request: &req,
        };
        self.execute(&tool, &ctx).await
    }

    #[tool(description = "Get GitHub issues: the last 10, or one by number")]
    async fn github_issue(
        &self,
        Parameters(req): Parameters<GithubRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = Github {
            kind: GithubKind::Issue,
            request: &req,
        };
        self.execute(&tool, &ctx).await
    }

    #[tool(description = "Get details of a ClickUp task. Requires CLICKUP_API_TOKEN.")]
    async fn clickup_task(
        &self,
        Parameters(req): Parameters<ClickupTaskRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    #[tool(description = "Search the MCP Marketplace for available servers")]
    async fn mcp_search(
        &self,
        Parameters(req): Parameters<McpRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = Mcp {
            action: McpAction::Search,
            request: &req,
        };
        self.execute(&tool, &ctx).await
    }

    #[tool(description = "Run MCP server tools from a natural-language query")]
    async fn mcp_run(
        &self,
        Parameters(req): Parameters<McpRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = Mcp {
            action: McpAction::Run,
            request: &req,
        };
        self.execute(&tool, &ctx).await
    }

    /* ---- browser ---- */

    #[tool(description = "Open a URL and capture page content, console logs and network activity")]
    async fn browser_open(
        &self,
        Parameters(req): Parameters<BrowserOpenRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    #[tool(description = "Act on a web page from natural-language instructions (steps split by |)")]
    async fn browser_act(
        &self,
        Parameters(req): Parameters<BrowserInstructionRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = Browser {
            action: BrowserAction::Act,
            request: &req,
        };
        self.execute(&tool, &ctx).await
    }

    #[tool(description = "Observe interactive elements on a web page and suggest actions")]
    async fn browser_observe(
        &self,
        Parameters(req): Parameters<BrowserInstructionRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = Browser {
            action: BrowserAction::Observe,
            request: &req,
        };
        self.execute(&tool, &ctx).await
    }

    #[tool(description = "Extract data from a web page based on natural-language instructions")]
    async fn browser_extract(
        &self,
        Parameters(req): Parameters<BrowserInstructionRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = Browser {
            action: BrowserAction::Extract,
            request: &req,
        };
        self.execute(&tool, &ctx).await
    }

    /* ---- xcode ---- */

    #[tool(description = "Build the Xcode project and report errors")]
    async fn xcode_build(
        &self,
        Parameters(req): Parameters<XcodeBuildRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    #[tool(description = "Build and run the Xcode project on a simulator")]
    async fn xcode_run(
        &self,
        Parameters(req): Parameters<XcodeRunRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }

    #[tool(description = "Run static analysis on the Xcode project")]
    async fn xcode_lint(
        &self,
        Parameters(req): Parameters<XcodeLintRequest>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.execute(&req, &ctx).await
    }
}

#[tool_handler]
impl ServerHandler for CursorToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_logging()
                .build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}
