/*!
`call.rs`

Implements `cursor-tools-mcp call <TOOL>`: a small debugging client that
spawns a server (this binary by default), invokes one tool and prints the
result.

Parameters:
  --param KEY=VALUE              (repeatable)
  --param-file params.(json|yaml) (merged; --param wins on conflicts)

Values are coerced against the tool's input schema (integer / number /
boolean / array, default string).

JSON Output:
{
  "status": "ok" | "error",
  "tool": "ask",
  "target": "...",
  "elapsed_ms": 42,
  "arguments": { ... },
  "result": { ...CallToolResult... }
}
*/

use anyhow::{Context, Result};
use clap::Args;
use std::collections::HashMap;
use std::time::Instant;

use crate::cmd::shared::{
    build_arguments_from_schema, extract_tool_array, find_tool_case_insensitive,
    load_param_file_into_map, parse_params, resolve_target, result_is_error, result_text,
};
use crate::mcp::{self, TargetSpec};

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name to invoke
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// MCP server command line (falls back to MCP_TARGET, then this binary)
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute_call(args: CallArgs) -> Result<()> {
    let tool_name = args.tool.trim();
    if tool_name.is_empty() {
        anyhow::bail!("tool name cannot be empty");
    }

    let mut provided = parse_params(&args.params)?;
    if let Some(pf) = &args.param_file {
        load_param_file_into_map(pf, &mut provided)?;
    }

    let spec = resolve_target(args.target.as_deref())?;

    let started = Instant::now();
    let (arguments, result) = invoke_tool(&spec, tool_name, &provided).await?;
    let elapsed_ms = started.elapsed().as_millis();
    let failed = result_is_error(&result);

    if args.json {
        let out = serde_json::json!({
            "status": if failed { "error" } else { "ok" },
            "tool": tool_name,
            "target": spec.original,
            "elapsed_ms": elapsed_ms,
            "arguments": arguments,
            "result": result,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", result_text(&result));
    }

    if failed {
        anyhow::bail!("tool '{tool_name}' reported an error");
    }
    Ok(())
}

async fn invoke_tool(
    spec: &TargetSpec,
    tool_name: &str,
    provided: &HashMap<String, String>,
) -> Result<(serde_json::Map<String, serde_json::Value>, serde_json::Value)> {
    use rmcp::model::CallToolRequestParam;

    let service = mcp::connect(spec).await?;

    let tools_resp = service
        .list_tools(Default::default())
        .await
        .context("Failed to list tools")?;
    let tools = extract_tool_array(&serde_json::to_value(&tools_resp)?);

    let tool_val = find_tool_case_insensitive(&tools, tool_name)
        .ok_or_else(|| anyhow::anyhow!("tool '{tool_name}' not found"))?;
    let tool_obj = tool_val
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("tool JSON is not an object"))?;
    let canonical = tool_obj
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or(tool_name)
        .to_string();

    let arg_obj =
        build_arguments_from_schema(tool_obj, provided).context("Failed to build arguments")?;
    tracing::debug!(tool = %canonical, args = ?arg_obj, "calling tool");

    let call_result = service
        .call_tool(CallToolRequestParam {
            name: canonical.clone().into(),
            arguments: if arg_obj.is_empty() {
                None
            } else {
                Some(arg_obj.clone())
            },
        })
        .await
        .with_context(|| format!("tool invocation failed: {canonical}"))?;

    if let Err(e) = service.cancel().await {
        tracing::debug!(error = %e, "shutdown after call_tool failed");
    }

    Ok((arg_obj, serde_json::to_value(&call_result)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Call(CallArgs),
    }

    #[test]
    fn clap_parses_repeated_params() {
        let cli = TestCli::try_parse_from([
            "t",
            "call",
            "ask",
            "--param",
            "query=hello",
            "--param",
            "provider=openai",
            "--param-file",
            "p.yaml",
            "--json",
        ])
        .unwrap();
        let TestSub::Call(a) = cli.cmd;
        assert_eq!(a.tool, "ask");
        assert_eq!(a.params, vec!["query=hello", "provider=openai"]);
        assert_eq!(a.param_file.as_deref(), Some("p.yaml"));
        assert!(a.json);
    }

    #[tokio::test]
    async fn empty_tool_name_rejected() {
        let args = CallArgs {
            tool: "  ".into(),
            params: vec![],
            param_file: None,
            target: None,
            json: false,
        };
        let err = execute_call(args).await.unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }
}
