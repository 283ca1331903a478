//! LLM-backed commands: ask, plan, web, repo, doc.

use rmcp::schemars;
use serde::Deserialize;

use super::{CliTool, SAVE_TO, assemble, base};
use crate::args::{ArgClasses, Params};
use crate::runner::Invocation;
use crate::workdir::WorkingDirectory;

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct AskRequest {
    /// Question to ask the LLM
    pub query: String,
    /// Maximum tokens for the response
    pub max_tokens: Option<u32>,
    /// AI provider (openai, anthropic, perplexity, gemini, modelbox, openrouter)
    pub provider: Option<String>,
    /// Model name to use
    pub model: Option<String>,
    /// Reasoning depth (low, medium, high)
    pub reasoning_effort: Option<String>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

impl CliTool for AskRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let params = Params::new()
            .with("max_tokens", self.max_tokens)
            .with("provider", self.provider.as_deref())
            .with("model", self.model.as_deref())
            .with("reasoning_effort", self.reasoning_effort.as_deref())
            .with("save_to", self.save_to.as_deref());
        assemble(base(exe, &["ask", self.query.as_str()]), &params, &SAVE_TO, workdir)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct PlanRequest {
    /// The implementation task to plan
    pub query: String,
    /// Maximum tokens for the response
    pub max_tokens: Option<u32>,
    /// Provider used to identify relevant files
    pub file_provider: Option<String>,
    /// Provider used to generate the plan
    pub thinking_provider: Option<String>,
    /// Model used to identify relevant files
    pub file_model: Option<String>,
    /// Model used to generate the plan
    pub thinking_model: Option<String>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

impl CliTool for PlanRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let params = Params::new()
            .with("max_tokens", self.max_tokens)
            .with("file_provider", self.file_provider.as_deref())
            .with("thinking_provider", self.thinking_provider.as_deref())
            .with("file_model", self.file_model.as_deref())
            .with("thinking_model", self.thinking_model.as_deref())
            .with("save_to", self.save_to.as_deref());
        assemble(base(exe, &["plan", self.query.as_str()]), &params, &SAVE_TO, workdir)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct WebRequest {
    /// Question to research on the web
    pub query: String,
    /// Maximum tokens for the response
    pub max_tokens: Option<u32>,
    /// AI provider with web search capabilities
    pub provider: Option<String>,
    /// Model name to use
    pub model: Option<String>,
    /// Maximum search results to consider
    pub max_search_results: Option<u32>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

impl CliTool for WebRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let params = Params::new()
            .with("max_tokens", self.max_tokens)
            .with("provider", self.provider.as_deref())
            .with("model", self.model.as_deref())
            .with("max_search_results", self.max_search_results)
            .with("save_to", self.save_to.as_deref());
        assemble(base(exe, &["web", self.query.as_str()]), &params, &SAVE_TO, workdir)
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct RepoRequest {
    /// Question about the repository
    pub query: String,
    /// Maximum tokens for the response
    pub max_tokens: Option<u32>,
    /// AI provider to use
    pub provider: Option<String>,
    /// Model name to use
    pub model: Option<String>,
    /// Analyze a remote GitHub repository instead of the working directory
    pub from_github: Option<bool>,
    /// URL of the GitHub repository
    pub repo_url: Option<String>,
    /// Restrict analysis to this subdirectory
    pub subdir: Option<String>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

const REPO_CLASSES: ArgClasses = ArgClasses {
    paths: &["save_to", "subdir"],
    flags: &["from_github"],
    toggles: &[],
};

impl CliTool for RepoRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let params = Params::new()
            .with("max_tokens", self.max_tokens)
            .with("provider", self.provider.as_deref())
            .with("model", self.model.as_deref())
            .with("repo_url", self.repo_url.as_deref())
            .with("subdir", self.subdir.as_deref())
            .with("save_to", self.save_to.as_deref())
            .with("from_github", self.from_github);
        assemble(base(exe, &["repo", self.query.as_str()]), &params, &REPO_CLASSES, workdir)
            .remote(self.from_github.unwrap_or(false))
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct DocRequest {
    /// Optional query to focus the documentation
    pub query: Option<String>,
    /// Maximum tokens for the response
    pub max_tokens: Option<u32>,
    /// AI provider to use
    pub provider: Option<String>,
    /// Model name to use
    pub model: Option<String>,
    /// Document a remote GitHub repository
    pub from_github: Option<bool>,
    /// URL of the GitHub repository
    pub repo_url: Option<String>,
    /// Output file path
    pub output: Option<String>,
    /// Used as `output` when `output` is not given
    pub save_to: Option<String>,
}

const DOC_CLASSES: ArgClasses = ArgClasses {
    paths: &["output"],
    flags: &["from_github"],
    toggles: &[],
};

impl CliTool for DocRequest {
    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        let mut command = base(exe, &["doc"]);
        if let Some(q) = self.query.as_deref().filter(|q| !q.is_empty()) {
            command.push(q.to_string());
        }

        let output = self.output.as_deref().or(self.save_to.as_deref());
        let params = Params::new()
            .with("max_tokens", self.max_tokens)
            .with("provider", self.provider.as_deref())
            .with("model", self.model.as_deref())
            .with("repo_url", self.repo_url.as_deref())
            .with("from_github", self.from_github)
            .with("output", output);
        assemble(command, &params, &DOC_CLASSES, workdir).remote(self.from_github.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{has, wd};

    #[test]
    fn ask_builds_full_command() {
        let req = AskRequest {
            query: "What is the capital of France?".into(),
            max_tokens: Some(100),
            provider: Some("openai".into()),
            model: Some("gpt-4".into()),
            reasoning_effort: Some("high".into()),
            save_to: Some("output.txt".into()),
        };
        let inv = req.invocation("cursor-tools", &wd());
        assert_eq!(
            &inv.args[0..3],
            &["cursor-tools", "ask", "What is the capital of France?"]
        );
        assert!(has(&inv.args, "--save-to=/cwd/output.txt"));
        assert!(has(&inv.args, "--max-tokens=100"));
        assert!(has(&inv.args, "--provider=openai"));
        assert!(has(&inv.args, "--model=gpt-4"));
        assert!(has(&inv.args, "--reasoning-effort=high"));
        assert!(!inv.remote);
    }

    #[test]
    fn plan_maps_provider_pairs() {
        let req = PlanRequest {
            query: "add auth".into(),
            max_tokens: None,
            file_provider: Some("gemini".into()),
            thinking_provider: Some("openai".into()),
            file_model: None,
            thinking_model: Some("o3".into()),
            save_to: None,
        };
        let inv = req.invocation("ct", &wd());
        assert_eq!(
            inv.args,
            vec![
                "ct",
                "plan",
                "add auth",
                "--file-provider=gemini",
                "--thinking-provider=openai",
                "--thinking-model=o3"
            ]
        );
    }

    #[test]
    fn web_passes_search_limit() {
        let req = WebRequest {
            query: "rust 2024 edition".into(),
            max_tokens: None,
            provider: Some("perplexity".into()),
            model: None,
            max_search_results: Some(5),
            save_to: None,
        };
        let inv = req.invocation("ct", &wd());
        assert!(has(&inv.args, "--max-search-results=5"));
    }

    #[test]
    fn repo_from_github_switches_to_remote_mode() {
        let req = RepoRequest {
            query: "how is auth done".into(),
            max_tokens: None,
            provider: None,
            model: None,
            from_github: Some(true),
            repo_url: Some("https://github.com/o/r".into()),
            subdir: Some("src".into()),
            save_to: None,
        };
        let inv = req.invocation("ct", &wd());
        assert!(inv.remote);
        assert!(has(&inv.args, "--from-github"));
        assert!(has(&inv.args, "--subdir=/cwd/src"));
        assert!(has(&inv.args, "--repo-url=https://github.com/o/r"));
        assert_eq!(inv.args.last().unwrap(), "--from-github");
    }

    #[test]
    fn repo_local_by_default() {
        let req = RepoRequest {
            query: "q".into(),
            max_tokens: None,
            provider: None,
            model: None,
            from_github: Some(false),
            repo_url: None,
            subdir: None,
            save_to: None,
        };
        let inv = req.invocation("ct", &wd());
        assert!(!inv.remote);
        assert!(!inv.args.iter().any(|a| a.contains("from-github")));
    }

    #[test]
    fn doc_falls_back_to_save_to_for_output() {
        let req = DocRequest {
            query: None,
            max_tokens: None,
            provider: None,
            model: None,
            from_github: None,
            repo_url: None,
            output: None,
            save_to: Some("docs/REPO.md".into()),
        };
        let inv = req.invocation("ct", &wd());
        assert_eq!(inv.args, vec!["ct", "doc", "--output=/cwd/docs/REPO.md"]);
    }

    #[test]
    fn doc_prefers_output_and_appends_query() {
        let req = DocRequest {
            query: Some("api surface".into()),
            max_tokens: None,
            provider: None,
            model: None,
            from_github: None,
            repo_url: None,
            output: Some("a.md".into()),
            save_to: Some("b.md".into()),
        };
        let inv = req.invocation("ct", &wd());
        assert_eq!(inv.args, vec!["ct", "doc", "api surface", "--output=/cwd/a.md"]);
    }
}
