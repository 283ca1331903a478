/*!
Process runner: launch one cursor-tools child, stream its output, render a
single text result.

Lifecycle of one invocation:
  starting  : pick the directory, spawn with stdout/stderr piped separately
  running   : one task multiplexes stdout lines, stderr lines, child exit,
              the heartbeat deadline, cancellation and the optional timeout
  draining  : after exit, read both pipes to EOF so trailing output survives
  done      : progress 100, render `Command successful` / `Command failed`
  failed    : launch problems become result text; faults while streaming
              (read error, cancellation, timeout) terminate the child and
              come back as `Err`

Progress is `min(elapsed_secs / 3, 95)` while running and exactly 100 once at
the end. Any line resets the heartbeat timer.
*/

pub mod terminate;

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::config::{ENV_CURSOR_TOOLS_PATH, ENV_VIBE_TOOLS_PATH};
use crate::utils::Progress;
use crate::workdir::WorkingDirectory;

/// Denominator of every progress notification.
pub const PROGRESS_TOTAL: u32 = 100;

/* ---- Invocation ---- */

/// A finished argv (program first) plus where to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    /// Run in the server's real cwd instead of the configured working
    /// directory (the target is a remote repository, not the local project).
    pub remote: bool,
}

impl Invocation {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            remote: false,
        }
    }

    pub fn remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    /// Shell-quoted rendering for logs.
    pub fn command_line(&self) -> String {
        shell_words::join(&self.args)
    }

    fn execution_dir(&self, workdir: &WorkingDirectory) -> Result<PathBuf, RunError> {
        if self.remote {
            std::env::current_dir().map_err(RunError::CurrentDir)
        } else {
            Ok(workdir.current())
        }
    }
}

/* ---- Result ---- */

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// `-1` when the child was ended by a signal.
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn render(&self) -> String {
        let stdout = self.stdout.join("\n");
        if self.success() {
            format!("Command successful:\n{stdout}")
        } else {
            format!(
                "Command failed with code {}:\nStdout:\n{}\nStderr:\n{}",
                self.exit_code,
                stdout,
                self.stderr.join("\n")
            )
        }
    }
}

/* ---- Sink ---- */

/// Where live output and progress go while a command runs.
#[async_trait]
pub trait RunSink: Send + Sync {
    async fn info(&self, message: &str);
    async fn error(&self, message: &str);
    async fn progress(&self, current: u32, total: u32);
}

/// Optional sink; absent means notifications are skipped.
#[derive(Clone, Copy)]
struct Notifier<'a>(Option<&'a dyn RunSink>);

impl Notifier<'_> {
    async fn info(&self, message: &str) {
        if let Some(sink) = self.0 {
            sink.info(message).await;
        }
    }

    async fn error(&self, message: &str) {
        if let Some(sink) = self.0 {
            sink.error(message).await;
        }
    }

    async fn progress(&self, pct: u32) {
        if let Some(sink) = self.0 {
            sink.progress(pct, PROGRESS_TOTAL).await;
        }
    }
}

/* ---- Errors ---- */

#[derive(Debug, Error)]
pub enum RunError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("{executable} executable not found")]
    ExecutableNotFound { executable: String },

    #[error("working directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("failed to read current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed reading child {stream}: {source}")]
    Stream {
        stream: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for child: {0}")]
    Wait(#[source] io::Error),

    #[error("command cancelled by caller")]
    Cancelled,

    #[error("command exceeded the {}s time limit", .0.as_secs())]
    TimedOut(Duration),
}

impl RunError {
    /// True for problems that happen before the child exists. These are
    /// reported as result text, not as a failed invocation.
    pub fn is_launch(&self) -> bool {
        matches!(
            self,
            RunError::EmptyCommand
                | RunError::ExecutableNotFound { .. }
                | RunError::MissingDirectory(_)
                | RunError::CurrentDir(_)
                | RunError::Launch { .. }
        )
    }

    /// Caller-facing text for launch problems.
    pub fn user_message(&self) -> String {
        match self {
            RunError::ExecutableNotFound { .. } => format!(
                "Error: cursor-tools executable not found. Set {ENV_VIBE_TOOLS_PATH} or \
                 {ENV_CURSOR_TOOLS_PATH} environment variable to the absolute path of the \
                 cursor-tools executable."
            ),
            other => format!("Error executing command: {other}"),
        }
    }
}

/* ---- Options ---- */

/// Per-invocation knobs.
#[derive(Clone, Default)]
pub struct RunOptions<'a> {
    pub sink: Option<&'a dyn RunSink>,
    pub cancel: CancellationToken,
    pub timeout: Option<Duration>,
}

/* ---- Entry point ---- */

/// Run one invocation to completion.
///
/// `Ok` carries the rendered result, including launch failures. `Err` means
/// the child was torn down mid-stream.
pub async fn run(
    invocation: Invocation,
    workdir: &WorkingDirectory,
    options: RunOptions<'_>,
) -> Result<String, RunError> {
    let notify = Notifier(options.sink);

    let (mut child, mut progress) = match start(&invocation, workdir, notify).await {
        Ok(started) => started,
        Err(e) => {
            let message = e.user_message();
            tracing::warn!(error = %e, "launch failed");
            notify.error(&message).await;
            return Ok(message);
        }
    };

    let deadline = options.timeout.map(|t| (Instant::now() + t, t));
    match pump(&mut child, &mut progress, notify, &options.cancel, deadline).await {
        Ok(result) => {
            notify.progress(PROGRESS_TOTAL).await;
            tracing::info!(
                code = result.exit_code,
                elapsed_secs = result.elapsed.as_secs_f64(),
                lines = progress.lines(),
                "command finished"
            );
            Ok(result.render())
        }
        Err(e) => {
            tracing::error!(error = %e, "fault while streaming command output");
            notify
                .error(&format!("Exception during command execution: {e}"))
                .await;
            terminate::shutdown(&mut child, terminate::GRACE_PERIOD).await;
            Err(e)
        }
    }
}

async fn start(
    invocation: &Invocation,
    workdir: &WorkingDirectory,
    notify: Notifier<'_>,
) -> Result<(Child, Progress), RunError> {
    let dir = invocation.execution_dir(workdir)?;
    let line = invocation.command_line();

    notify.info(&format!("Executing command: {line}")).await;
    notify
        .info(&format!("Working directory: {}", dir.display()))
        .await;
    tracing::debug!(command = %line, cwd = %dir.display(), "running command");

    let progress = Progress::new();
    notify.progress(0).await;

    let child = spawn(&invocation.args, &dir)?;
    Ok((child, progress))
}

fn spawn(args: &[String], dir: &Path) -> Result<Child, RunError> {
    let (program, rest) = args.split_first().ok_or(RunError::EmptyCommand)?;

    // ENOENT from a bad cwd would otherwise read as a missing executable.
    if !dir.is_dir() {
        return Err(RunError::MissingDirectory(dir.to_path_buf()));
    }

    Command::new(program)
        .args(rest)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                RunError::ExecutableNotFound {
                    executable: program.clone(),
                }
            } else {
                RunError::Launch {
                    program: program.clone(),
                    source,
                }
            }
        })
}

/* ---- Streaming loop ---- */

#[derive(Debug, Clone, Copy)]
enum Channel {
    Out,
    Err,
}

impl Channel {
    fn tag(self) -> &'static str {
        match self {
            Channel::Out => "OUT",
            Channel::Err => "ERR",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Channel::Out => "stdout",
            Channel::Err => "stderr",
        }
    }
}

#[derive(Default)]
struct Captured {
    stdout: Vec<String>,
    stderr: Vec<String>,
}

impl Captured {
    async fn record(
        &mut self,
        channel: Channel,
        raw: Vec<u8>,
        progress: &mut Progress,
        notify: Notifier<'_>,
    ) {
        let line = String::from_utf8_lossy(&raw).trim_end().to_string();

        notify.info(&format!("{}: {line}", channel.tag())).await;
        if matches!(channel, Channel::Err) {
            tracing::debug!(line = %line, "child stderr");
        }
        progress.inc();
        let pct = progress.mark(Instant::now());
        notify.progress(pct).await;

        match channel {
            Channel::Out => self.stdout.push(line),
            Channel::Err => self.stderr.push(line),
        }
    }
}

fn read_fault(channel: Channel) -> impl FnOnce(io::Error) -> RunError {
    move |source| RunError::Stream {
        stream: channel.name(),
        source,
    }
}

async fn pump(
    child: &mut Child,
    progress: &mut Progress,
    notify: Notifier<'_>,
    cancel: &CancellationToken,
    deadline: Option<(Instant, Duration)>,
) -> Result<ExecutionResult, RunError> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| read_fault(Channel::Out)(io::Error::other("stdout not captured")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| read_fault(Channel::Err)(io::Error::other("stderr not captured")))?;

    let mut out_lines = BufReader::new(stdout).split(b'\n');
    let mut err_lines = BufReader::new(stderr).split(b'\n');
    let (mut out_open, mut err_open) = (true, true);
    let mut status: Option<ExitStatus> = None;
    let mut captured = Captured::default();

    while status.is_none() || out_open || err_open {
        let heartbeat = tokio::time::sleep_until(progress.heartbeat_deadline().into());
        let limit = async {
            match deadline {
                Some((at, _)) => tokio::time::sleep_until(at.into()).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(RunError::Cancelled),

            _ = limit => {
                let limit = deadline.map(|(_, d)| d).unwrap_or_default();
                return Err(RunError::TimedOut(limit));
            }

            line = out_lines.next_segment(), if out_open => {
                match line.map_err(read_fault(Channel::Out))? {
                    Some(raw) => captured.record(Channel::Out, raw, progress, notify).await,
                    None => out_open = false,
                }
            }

            line = err_lines.next_segment(), if err_open => {
                match line.map_err(read_fault(Channel::Err))? {
                    Some(raw) => captured.record(Channel::Err, raw, progress, notify).await,
                    None => err_open = false,
                }
            }

            exit = child.wait(), if status.is_none() => {
                let exit = exit.map_err(RunError::Wait)?;
                tracing::debug!(?exit, "child exited, draining output");
                status = Some(exit);
            }

            _ = heartbeat, if status.is_none() => {
                let pct = progress.mark(Instant::now());
                tracing::debug!(pct, "progress heartbeat");
                notify.progress(pct).await;
            }
        }
    }

    let exit_code = status.map(exit_code_of).unwrap_or(-1);
    Ok(ExecutionResult {
        exit_code,
        stdout: captured.stdout,
        stderr: captured.stderr,
        elapsed: progress.elapsed(),
    })
}

/// Exit code, or `-<signal>` for a child killed by a signal.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return -sig;
        }
    }
    -1
}

/* ---- Tests ---- */
