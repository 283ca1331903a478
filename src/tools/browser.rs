/*!
browser.rs - Stagehand browser automation commands.

All four commands share one option set:
  paths   : screenshot, video, save_to
  flags   : html
  toggles : console, network, headless  (`--no-<name>` when false)

`url` is checked up front so a typo fails fast instead of after a browser
has been started.
*/

use rmcp::schemars;
use serde::Deserialize;
use url::Url;

use super::{CliTool, assemble, base};
use crate::args::{ArgClasses, ParamValue, Params};
use crate::runner::Invocation;
use crate::workdir::WorkingDirectory;

const BROWSER_CLASSES: ArgClasses = ArgClasses {
    paths: &["screenshot", "video", "save_to"],
    flags: &["html"],
    toggles: &["console", "network", "headless"],
};

/// Chrome debugging endpoint: a port number or `host:port` / URL string.
#[derive(Debug, Clone, PartialEq, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum ConnectTo {
    Port(i64),
    Address(String),
}

impl From<&ConnectTo> for ParamValue {
    fn from(v: &ConnectTo) -> Self {
        match v {
            ConnectTo::Port(p) => ParamValue::Int(*p),
            ConnectTo::Address(a) => ParamValue::Text(a.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct BrowserOptions {
    /// Capture browser console logs (false passes --no-console)
    pub console: Option<bool>,
    /// Capture page HTML content
    pub html: Option<bool>,
    /// Capture network activity (false passes --no-network)
    pub network: Option<bool>,
    /// Path to save a screenshot, relative to the working directory
    pub screenshot: Option<String>,
    /// Navigation timeout in milliseconds
    pub timeout: Option<u32>,
    /// Viewport size, e.g. 1280x720
    pub viewport: Option<String>,
    /// Run headless (false passes --no-headless)
    pub headless: Option<bool>,
    /// Connect to an existing Chrome instance (port or address)
    pub connect_to: Option<ConnectTo>,
    /// Wait condition before acting
    pub wait: Option<String>,
    /// Directory to save a video recording, relative to the working directory
    pub video: Option<String>,
    /// JavaScript to evaluate in the page
    pub evaluate: Option<String>,
    /// Path to save the response, relative to the working directory
    pub save_to: Option<String>,
}

impl BrowserOptions {
    fn params(&self, url: Option<&str>) -> Params {
        let mut params = Params::new();
        if let Some(u) = url {
            params.insert("url", Some(u));
        }
        params
            .with("console", self.console)
            .with("html", self.html)
            .with("network", self.network)
            .with("screenshot", self.screenshot.as_deref())
            .with("timeout", self.timeout)
            .with("viewport", self.viewport.as_deref())
            .with("headless", self.headless)
            .with("connect_to", self.connect_to.as_ref())
            .with("wait", self.wait.as_deref())
            .with("video", self.video.as_deref())
            .with("evaluate", self.evaluate.as_deref())
            .with("save_to", self.save_to.as_deref())
    }
}

fn check_url(raw: &str) -> Result<(), String> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|e| format!("Error: invalid URL '{raw}': {e}"))
}

/* ---- open ---- */

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct BrowserOpenRequest {
    /// URL to open
    pub url: String,
    #[serde(flatten)]
    pub options: BrowserOptions,
}

impl CliTool for BrowserOpenRequest {
    fn validate(&self) -> Result<(), String> {
        check_url(&self.url)
    }

    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        assemble(
            base(exe, &["browser", "open", self.url.as_str()]),
            &self.options.params(None),
            &BROWSER_CLASSES,
            workdir,
        )
    }
}

/* ---- act / observe / extract ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserAction {
    Act,
    Observe,
    Extract,
}

impl BrowserAction {
    fn as_str(self) -> &'static str {
        match self {
            BrowserAction::Act => "act",
            BrowserAction::Observe => "observe",
            BrowserAction::Extract => "extract",
        }
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct BrowserInstructionRequest {
    /// Natural-language instruction; separate steps with `|`
    pub instruction: String,
    /// URL to navigate to first
    pub url: Option<String>,
    #[serde(flatten)]
    pub options: BrowserOptions,
}

pub struct Browser<'a> {
    pub action: BrowserAction,
    pub request: &'a BrowserInstructionRequest,
}

impl CliTool for Browser<'_> {
    fn validate(&self) -> Result<(), String> {
        match self.request.url.as_deref() {
            Some(u) if !u.is_empty() => check_url(u),
            _ => Ok(()),
        }
    }

    fn invocation(&self, exe: &str, workdir: &WorkingDirectory) -> Invocation {
        assemble(
            base(
                exe,
                &["browser", self.action.as_str(), self.request.instruction.as_str()],
            ),
            &self.request.options.params(self.request.url.as_deref()),
            &BROWSER_CLASSES,
            workdir,
        )
    }
}
