/*!
config.rs - startup settings.

Sources, highest precedence first:
  executable        : config file `executable` > VIBE_TOOLS_PATH > CURSOR_TOOLS_PATH > "cursor-tools"
  working_directory : --workdir > config file `working_directory` > process cwd
  timeout           : --timeout-secs > config file `timeout_secs` > none

The config file is optional, JSON or YAML (chosen by extension), and is read
once. The executable is never re-read after startup.
*/

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_EXECUTABLE: &str = "cursor-tools";

/// Env override checked first.
pub const ENV_VIBE_TOOLS_PATH: &str = "VIBE_TOOLS_PATH";
/// Env override checked second.
pub const ENV_CURSOR_TOOLS_PATH: &str = "CURSOR_TOOLS_PATH";

#[derive(Debug, Clone)]
pub struct Settings {
    pub executable: String,
    pub working_directory: PathBuf,
    /// Upper bound on one child process. `None` means unbounded.
    pub timeout: Option<Duration>,
}

/// On-disk shape of `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub executable: Option<String>,
    pub working_directory: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Overrides coming from the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub workdir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn load(cli: &CliOverrides) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => load_file(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file, |k| std::env::var(k).ok())
    }

    /// Pure resolution step; `env` is injected so tests need not touch the
    /// real environment.
    pub fn resolve(
        cli: &CliOverrides,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let executable = file
            .executable
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| executable_from_env(&env));

        let working_directory = match cli.workdir.clone().or(file.working_directory) {
            Some(dir) => dir,
            None => std::env::current_dir().context("failed to read current directory")?,
        };

        let timeout = cli
            .timeout_secs
            .or(file.timeout_secs)
            .filter(|s| *s > 0)
            .map(Duration::from_secs);

        Ok(Settings {
            executable,
            working_directory,
            timeout,
        })
    }
}

/// VIBE_TOOLS_PATH, then CURSOR_TOOLS_PATH, then the bare default name.
pub fn executable_from_env(env: impl Fn(&str) -> Option<String>) -> String {
    [ENV_VIBE_TOOLS_PATH, ENV_CURSOR_TOOLS_PATH]
        .iter()
        .find_map(|k| env(k).filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string())
}

/// Read a JSON or YAML config file.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let lower = path.to_string_lossy().to_ascii_lowercase();

    if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        serde_yaml::from_str(&raw).context("failed to parse YAML config file")
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn executable_defaults_to_bare_name() {
        assert_eq!(executable_from_env(env_of(&[])), "cursor-tools");
    }

    #[test]
    fn vibe_tools_path_takes_precedence() {
        let env = env_of(&[
            ("CURSOR_TOOLS_PATH", "/opt/cursor-tools"),
            ("VIBE_TOOLS_PATH", "/opt/vibe-tools"),
        ]);
        assert_eq!(executable_from_env(env), "/opt/vibe-tools");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let env = env_of(&[("VIBE_TOOLS_PATH", "  "), ("CURSOR_TOOLS_PATH", "/x/ct")]);
        assert_eq!(executable_from_env(env), "/x/ct");
    }

    #[test]
    fn cli_workdir_beats_file() {
        let cli = CliOverrides {
            workdir: Some(PathBuf::from("/from/cli")),
            ..Default::default()
        };
        let file = FileConfig {
            working_directory: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        let s = Settings::resolve(&cli, file, env_of(&[])).unwrap();
        assert_eq!(s.working_directory, PathBuf::from("/from/cli"));
    }

    #[test]
    fn file_executable_beats_env() {
        let file = FileConfig {
            executable: Some("/file/ct".into()),
            ..Default::default()
        };
        let s = Settings::resolve(
            &CliOverrides::default(),
            file,
            env_of(&[("VIBE_TOOLS_PATH", "/env/vt")]),
        )
        .unwrap();
        assert_eq!(s.executable, "/file/ct");
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        let cli = CliOverrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        let s = Settings::resolve(&cli, FileConfig::default(), env_of(&[])).unwrap();
        assert!(s.timeout.is_none());

        let file = FileConfig {
            timeout_secs: Some(30),
            ..Default::default()
        };
        let s = Settings::resolve(&CliOverrides::default(), file, env_of(&[])).unwrap();
        assert_eq!(s.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn loads_yaml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("settings.yaml");
        std::fs::write(&yaml, "executable: /usr/local/bin/vibe-tools\ntimeout_secs: 600\n").unwrap();
        let cfg = load_file(&yaml).unwrap();
        assert_eq!(cfg.executable.as_deref(), Some("/usr/local/bin/vibe-tools"));
        assert_eq!(cfg.timeout_secs, Some(600));

        let json = dir.path().join("settings.json");
        std::fs::write(&json, r#"{ "working_directory": "/srv/project" }"#).unwrap();
        let cfg = load_file(&json).unwrap();
        assert_eq!(cfg.working_directory, Some(PathBuf::from("/srv/project")));
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("bad.json");
        std::fs::write(&json, r#"{ "exe": "x" }"#).unwrap();
        assert!(load_file(&json).is_err());
    }
}
