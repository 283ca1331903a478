//! Orderly child shutdown: ask politely, wait, then kill.

use std::time::Duration;
use tokio::process::Child;

/// How long a terminated child gets to exit on its own.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Terminate `child` if it is still running. Never fails; errors are logged.
pub async fn shutdown(child: &mut Child, grace: Duration) {
    match child.try_wait() {
        Ok(Some(status)) => {
            tracing::debug!(?status, "child already exited, nothing to terminate");
            return;
        }
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "try_wait failed before terminate"),
    }

    request_termination(child);

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => tracing::debug!(?status, "child exited after terminate"),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "wait failed after terminate, killing");
            force_kill(child).await;
        }
        Err(_) => {
            tracing::warn!(grace_secs = grace.as_secs(), "child ignored terminate, killing");
            force_kill(child).await;
        }
    }
}

async fn force_kill(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "failed to kill child");
    }
}

/// SIGTERM on unix.
#[cfg(unix)]
fn request_termination(child: &mut Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = child.id().and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
        tracing::debug!(pid, error = %e, "SIGTERM failed");
    }
}

/// No soft signal elsewhere; start the kill and let the wait observe it.
#[cfg(not(unix))]
fn request_termination(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        tracing::debug!(error = %e, "start_kill failed");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Stdio;
    use std::time::Instant;
    use tokio::process::Command;

    #[tokio::test]
    async fn terminates_cooperative_child_quickly() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .spawn()
            .unwrap();

        let started = Instant::now();
        shutdown(&mut child, GRACE_PERIOD).await;
        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(child.try_wait().unwrap().is_some());
    }

    #[tokio::test]
    async fn kills_child_that_ignores_terminate() {
        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; sleep 30"])
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let started = Instant::now();
        shutdown(&mut child, Duration::from_millis(300)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(child.try_wait().unwrap().is_some());
    }

    #[tokio::test]
    async fn exited_child_is_left_alone() {
        let mut child = Command::new("true").spawn().unwrap();
        child.wait().await.unwrap();
        shutdown(&mut child, GRACE_PERIOD).await;
    }
}
