//! End-to-end: spawn the binary in serve mode, talk MCP over stdio, and run
//! tools against a stand-in `cursor-tools` shell script.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use rmcp::model::CallToolRequestParam;
use rmcp::service::RunningService;
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use rmcp::{RoleClient, ServiceExt};
use serde_json::{Value, json};
use tokio::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_cursor-tools-mcp");

fn fake_cli(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("cursor-tools");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

async fn start(executable: &Path, workdir: &Path) -> RunningService<RoleClient, ()> {
    let transport = TokioChildProcess::new(Command::new(BIN).configure(|c| {
        c.arg("serve").arg("--workdir").arg(workdir);
        c.env("CURSOR_TOOLS_PATH", executable);
        c.env_remove("VIBE_TOOLS_PATH");
        c.env_remove("RUST_LOG");
        c.stderr(std::process::Stdio::null());
    }))
    .unwrap();
    ().serve(transport).await.unwrap()
}

async fn call(service: &RunningService<RoleClient, ()>, name: &str, args: Value) -> Value {
    let result = service
        .call_tool(CallToolRequestParam {
            name: name.to_string().into(),
            arguments: args.as_object().cloned(),
        })
        .await
        .unwrap();
    serde_json::to_value(result).unwrap()
}

fn text(result: &Value) -> String {
    result["content"][0]["text"].as_str().unwrap_or("").to_string()
}

#[tokio::test]
async fn lists_all_tools() {
    let dir = tempfile::tempdir().unwrap();
    let exe = fake_cli(dir.path(), "exit 0");
    let service = start(&exe, dir.path()).await;

    let tools = service.list_tools(Default::default()).await.unwrap().tools;
    let names: Vec<String> = tools.iter().map(|t| t.name.to_string()).collect();
    for expected in [
        "ask",
        "plan",
        "repo",
        "browser_open",
        "xcode_lint",
        "set_working_directory",
        "test",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }
    assert_eq!(names.len(), 20);

    service.cancel().await.unwrap();
}

#[tokio::test]
async fn ask_streams_cli_output_into_result() {
    let dir = tempfile::tempdir().unwrap();
    let exe = fake_cli(dir.path(), "echo \"args: $*\"\necho \"cwd: $(pwd)\"\necho note >&2");
    let service = start(&exe, dir.path()).await;

    let result = call(
        &service,
        "ask",
        json!({ "query": "what is MCP?", "provider": "openai" }),
    )
    .await;
    let out = text(&result);
    assert!(out.starts_with("Command successful:\n"), "{out}");
    assert!(out.contains("args: ask what is MCP? --provider=openai"), "{out}");
    let dir_name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
    let cwd_line = out.lines().find(|l| l.starts_with("cwd: ")).unwrap_or("");
    assert!(cwd_line.ends_with(&dir_name), "{out}");
    assert!(!out.contains("note"), "stderr is not part of a successful result: {out}");

    service.cancel().await.unwrap();
}

#[tokio::test]
async fn failing_cli_reports_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let exe = fake_cli(dir.path(), "echo broken >&2\nexit 3");
    let service = start(&exe, dir.path()).await;

    let out = text(&call(&service, "plan", json!({ "query": "refactor" })).await);
    assert!(out.starts_with("Command failed with code 3:"), "{out}");
    assert!(out.contains("broken"), "{out}");

    service.cancel().await.unwrap();
}

#[tokio::test]
async fn missing_executable_is_explained() {
    let dir = tempfile::tempdir().unwrap();
    let service = start(&dir.path().join("does-not-exist"), dir.path()).await;

    let out = text(&call(&service, "web", json!({ "query": "rust" })).await);
    assert!(out.contains("CURSOR_TOOLS_PATH"), "{out}");

    service.cancel().await.unwrap();
}

#[tokio::test]
async fn working_directory_and_echo() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let exe = fake_cli(dir.path(), "pwd");
    let service = start(&exe, dir.path()).await;

    let out = text(
        &call(
            &service,
            "set_working_directory",
            json!({ "directory_path": "sub" }),
        )
        .await,
    );
    assert!(out.starts_with("Working directory set to: "), "{out}");
    assert!(out.ends_with("sub"), "{out}");

    let out = text(
        &call(
            &service,
            "set_working_directory",
            json!({ "directory_path": "nope" }),
        )
        .await,
    );
    assert_eq!(out, "Error: nope is not a valid directory");

    let out = text(&call(&service, "xcode_lint", json!({})).await);
    assert!(out.lines().nth(1).unwrap_or("").ends_with("sub"), "{out}");

    let out = text(&call(&service, "test", json!({ "message": "ping" })).await);
    assert_eq!(out, "Echo: ping");

    service.cancel().await.unwrap();
}

#[tokio::test]
async fn invalid_browser_url_is_a_tool_error() {
    let dir = tempfile::tempdir().unwrap();
    let exe = fake_cli(dir.path(), "exit 0");
    let service = start(&exe, dir.path()).await;

    let result = call(&service, "browser_open", json!({ "url": "not a url" })).await;
    assert_eq!(result["isError"], json!(true));
    assert!(text(&result).starts_with("Error: invalid URL"));

    service.cancel().await.unwrap();
}
