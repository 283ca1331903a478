/*!
shared.rs - helpers for the client subcommands (`list`, `call`).

Focus:
  - resolve_target: -t flag > MCP_TARGET env > this executable in serve mode
  - fetch_tools: spawn target + list tools
  - find_tool_case_insensitive
  - build_arguments_from_schema + primitive coercion
  - param file loading (JSON / YAML)
  - text extraction from a CallToolResult
*/

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::mcp::{self, TargetSpec};

/* ---- Target ---- */

pub const TARGET_ENV: &str = "MCP_TARGET";

/// Pick the server to talk to. An explicit flag wins, then `MCP_TARGET`;
/// with neither, this binary is spawned with `serve`.
pub fn resolve_target(explicit: Option<&str>) -> Result<TargetSpec> {
    let env_target = std::env::var(TARGET_ENV).ok();
    let chosen = explicit
        .or(env_target.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    match chosen {
        Some(raw) => {
            mcp::parse_target(raw).with_context(|| format!("Invalid target '{raw}'"))
        }
        None => TargetSpec::current_exe(),
    }
}

/* ---- Fetch ---- */

/// Tools advertised by a target.
#[derive(Debug)]
pub struct ToolList {
    /// Raw tool objects
    pub tools: Vec<serde_json::Value>,
    /// Spawn + enumerate + shutdown, in milliseconds
    pub elapsed_ms: u128,
}

impl ToolList {
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.tools.iter()
    }
}

pub async fn fetch_tools(spec: &TargetSpec) -> Result<ToolList> {
    let started = Instant::now();
    let service = mcp::connect(spec).await?;

    let tools_resp = service
        .list_tools(Default::default())
        .await
        .context("Failed to list tools from MCP service")?;

    if let Err(e) = service.cancel().await {
        tracing::debug!(error = %e, "shutdown after list_tools failed");
    }

    let val = serde_json::to_value(&tools_resp).context("Failed to serialize tool list")?;
    Ok(ToolList {
        tools: extract_tool_array(&val),
        elapsed_ms: started.elapsed().as_millis(),
    })
}

/* ---- Tool Object Utilities ---- */

/// Tool objects from a JSON value holding a `tools` array; empty when absent.
pub fn extract_tool_array(value: &serde_json::Value) -> Vec<serde_json::Value> {
    value
        .get("tools")
        .and_then(|v| v.as_array())
        .map(|arr| arr.to_vec())
        .unwrap_or_default()
}

pub fn find_tool_case_insensitive(
    tools: &[serde_json::Value],
    name: &str,
) -> Option<serde_json::Value> {
    tools
        .iter()
        .find(|t| {
            t.get("name")
                .and_then(|v| v.as_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
        .cloned()
}

/* ---- Argument Building / Schema Handling ---- */

/// Build a JSON arguments object from raw strings using the tool's input schema.
///
/// - Values are coerced by the property's declared `"type"`.
/// - Keys not in the schema pass through as strings.
/// - A missing `required` property is an error.
pub fn build_arguments_from_schema(
    tool_obj: &serde_json::Map<String, serde_json::Value>,
    provided: &HashMap<String, String>,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let schema = tool_obj
        .get("input_schema")
        .or_else(|| tool_obj.get("inputSchema"))
        .and_then(|v| v.as_object());
    let mut result = serde_json::Map::new();

    let required: HashSet<&str> = schema
        .and_then(|s| s.get("required"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|r| r.as_str()).collect())
        .unwrap_or_default();

    let mut remaining = provided.clone();

    if let Some(props) = schema
        .and_then(|s| s.get("properties"))
        .and_then(|v| v.as_object())
    {
        for (pname, pobj) in props {
            if let Some(raw_v) = remaining.remove(pname) {
                result.insert(pname.clone(), coerce_value(&raw_v, type_hint(pobj)));
            } else if required.contains(pname.as_str()) {
                anyhow::bail!("missing required parameter: {}", pname);
            }
        }
    }

    for (k, v) in remaining {
        result.insert(k, serde_json::Value::String(v));
    }

    Ok(result)
}

/// Primitive type of a property schema. Optional fields come out of schemars
/// as `"type": ["string", "null"]`; the first non-null entry wins.
fn type_hint(prop: &serde_json::Value) -> &str {
    match prop.get("type") {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Array(types)) => types
            .iter()
            .filter_map(|t| t.as_str())
            .find(|t| *t != "null")
            .unwrap_or("string"),
        _ => "string",
    }
}

/// Coerce a raw string into a JSON value using a primitive type hint.
pub fn coerce_value(raw: &str, type_hint: &str) -> serde_json::Value {
    match type_hint {
        "integer" => raw
            .parse::<i64>()
            .map(|n| serde_json::Value::Number(n.into()))
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string())),
        "number" => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(raw.to_string())),
        "boolean" => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => serde_json::Value::Bool(true),
            "false" | "0" | "no" | "n" => serde_json::Value::Bool(false),
            _ => serde_json::Value::String(raw.to_string()),
        },
        "array" => serde_json::Value::Array(
            raw.split(',')
                .map(|s| serde_json::Value::String(s.trim().to_string()))
                .collect(),
        ),
        _ => serde_json::Value::String(raw.to_string()),
    }
}

/* ---- Parameters ---- */

/// Parse repeated `KEY=VALUE` flags.
pub fn parse_params(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut provided = HashMap::new();
    for kv in pairs {
        let Some((k, v)) = kv.split_once('=') else {
            anyhow::bail!("invalid --param (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            anyhow::bail!("invalid --param (empty key): {kv}");
        }
        provided.insert(key.to_string(), v.trim().to_string());
    }
    Ok(provided)
}

/// Merge a JSON or YAML object into `provided`. Keys already present
/// (from `--param`) are kept.
pub fn load_param_file_into_map(path: &str, provided: &mut HashMap<String, String>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: serde_json::Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml_v: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let obj = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("param file root must be an object"))?;

    for (k, v) in obj {
        if provided.contains_key(k) {
            continue;
        }
        let s = match v {
            serde_json::Value::String(sv) => sv.clone(),
            _ => v.to_string(),
        };
        provided.insert(k.clone(), s);
    }
    Ok(())
}

/* ---- Results ---- */

/// Concatenated text content of a serialized `CallToolResult`.
pub fn result_text(result: &serde_json::Value) -> String {
    result
        .get("content")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|c| c.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

pub fn result_is_error(result: &serde_json::Value) -> bool {
    result
        .get("isError")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}
