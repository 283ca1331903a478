/*!
`list.rs`

Implements `cursor-tools-mcp list`: spawn a server (this binary by default),
enumerate its tools, print them.

JSON Output Shape:
{
  "status": "ok",
  "target": "<target>",
  "elapsed_ms": 12,
  "count": 2,
  "tools": [
    { "name": "ask", "description": "..." },
    { "name": "plan", "description": "..." }
  ]
}
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::shared::{ToolList, fetch_tools, resolve_target};

/// CLI arguments for `cursor-tools-mcp list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,

    /// MCP server command line (falls back to MCP_TARGET, then this binary)
    #[arg(short = 't', long)]
    pub target: Option<String>,
}

pub async fn execute_list(args: ListArgs) -> Result<()> {
    let spec = resolve_target(args.target.as_deref())?;
    let tool_list = fetch_tools(&spec).await?;

    if args.json {
        let items: Vec<_> = tool_list
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": str_field(t, "name").unwrap_or("<unnamed>"),
                    "description": str_field(t, "description").unwrap_or(""),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "status":"ok",
                "target": spec.original,
                "elapsed_ms": tool_list.elapsed_ms,
                "count": tool_list.count(),
                "tools": items
            })
        );
        return Ok(());
    }

    println!(
        "Tools ({}) - {} ({} ms)",
        tool_list.count(),
        spec,
        tool_list.elapsed_ms
    );
    print!("{}", render_rows(&tool_list));
    Ok(())
}

fn str_field<'a>(v: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(|x| x.as_str())
}

/// One line per tool: `name(params)  description`. Required params carry no
/// marker; optional ones end in `?`.
fn render_rows(list: &ToolList) -> String {
    let mut out = String::new();
    if list.count() == 0 {
        out.push_str("  (none)\n");
        return out;
    }
    for t in list.iter() {
        let name = str_field(t, "name").unwrap_or("<unnamed>");
        let desc = first_line(str_field(t, "description").unwrap_or(""));
        out.push_str(&format!("  {name}({})", param_summary(t)));
        if !desc.is_empty() {
            out.push_str(&format!("  {desc}"));
        }
        out.push('\n');
    }
    out
}

fn param_summary(tool: &serde_json::Value) -> String {
    let Some(schema) = tool.get("inputSchema").or_else(|| tool.get("input_schema")) else {
        return String::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|r| r.as_str()).collect())
        .unwrap_or_default();
    schema
        .get("properties")
        .and_then(|v| v.as_object())
        .map(|props| {
            props
                .keys()
                .map(|k| {
                    if required.contains(&k.as_str()) {
                        k.clone()
                    } else {
                        format!("{k}?")
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}
