//! Utilities: logging setup (tracing, stderr only) and per-invocation
//! progress tracking.
//!
//! Key items:
//!   init_logging / derive_level
//!   Progress (start, last emission, line counter)

use std::time::{Duration, Instant};

/// Logging helpers.
///
/// stdout is reserved for the MCP transport, so every subscriber built here
/// writes to stderr.
pub mod logging {
    use tracing_subscriber::EnvFilter;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "error",
                LogLevel::Info => "info",
                LogLevel::Debug => "debug",
                LogLevel::Trace => "trace",
            }
        }
    }

    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Install the global subscriber. `RUST_LOG` wins over the derived level.
    ///
    /// Calling this twice is harmless; the second install is ignored.
    pub fn init_logging(level: LogLevel) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cursor_tools_mcp={},warn", level.as_str()))
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(false)
            .compact()
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};

/* ---- Progress ---- */

/// Seconds of runtime per progress unit.
pub const PROGRESS_STEP: Duration = Duration::from_secs(3);

/// Highest percentage reported while the child is still running.
pub const PROGRESS_CAP: u32 = 95;

/// Progress state for one invocation: when it started, when progress was
/// last emitted, and how many output lines have been seen.
#[derive(Debug)]
pub struct Progress {
    started: Instant,
    last_emit: Instant,
    lines: u64,
}

impl Progress {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(started: Instant) -> Self {
        Self {
            started,
            last_emit: started,
            lines: 0,
        }
    }

    pub fn inc(&mut self) {
        self.lines += 1;
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Running percentage: one unit per `PROGRESS_STEP`, capped at `PROGRESS_CAP`.
    pub fn percent_at(&self, now: Instant) -> u32 {
        percent_for(now.saturating_duration_since(self.started))
    }

    /// Instant at which the next heartbeat is due.
    pub fn heartbeat_deadline(&self) -> Instant {
        self.last_emit + PROGRESS_STEP
    }

    /// Record an emission at `now` and return the percentage to report.
    pub fn mark(&mut self, now: Instant) -> u32 {
        self.last_emit = now;
        self.percent_at(now)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

pub fn percent_for(elapsed: Duration) -> u32 {
    let steps = elapsed.as_secs() / PROGRESS_STEP.as_secs();
    u32::try_from(steps).unwrap_or(u32::MAX).min(PROGRESS_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_from_flags() {
        assert_eq!(derive_level(0, true), logging::LogLevel::Error);
        assert_eq!(derive_level(3, true), logging::LogLevel::Error);
        assert_eq!(derive_level(0, false), logging::LogLevel::Info);
        assert_eq!(derive_level(1, false), logging::LogLevel::Debug);
        assert_eq!(derive_level(2, false), logging::LogLevel::Trace);
    }

    #[test]
    fn percent_steps_every_three_seconds() {
        assert_eq!(percent_for(Duration::from_secs(0)), 0);
        assert_eq!(percent_for(Duration::from_millis(2999)), 0);
        assert_eq!(percent_for(Duration::from_secs(3)), 1);
        assert_eq!(percent_for(Duration::from_secs(10)), 3);
    }

    #[test]
    fn percent_caps_at_ninety_five() {
        assert_eq!(percent_for(Duration::from_secs(285)), 95);
        assert_eq!(percent_for(Duration::from_secs(10_000)), 95);
    }

    #[test]
    fn heartbeat_resets_on_mark() {
        let start = Instant::now();
        let mut p = Progress::starting_at(start);
        assert_eq!(p.heartbeat_deadline(), start + Duration::from_secs(3));

        let pct = p.mark(start + Duration::from_secs(4));
        assert_eq!(pct, 1);
        assert_eq!(p.heartbeat_deadline(), start + Duration::from_secs(7));
    }

    #[test]
    fn counts_lines() {
        let mut p = Progress::new();
        p.inc();
        p.inc();
        assert_eq!(p.lines(), 2);
    }
}
