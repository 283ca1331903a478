/*!
args.rs - turn named tool parameters into a flat cursor-tools argv.

Rules (per entry, first match wins):
  1. absent value           -> omitted
  2. plain flag             -> `--name` when truthy, nothing otherwise
  3. toggle (tri-state)     -> `--name` for `true`, `--no-name` for `false`
  4. path (truthy)          -> `--name=<working dir joined + normalized>`
  5. anything else          -> `--name=value`, or `--name="value"` when the
                               text contains a space

Names are kebab-cased by swapping every `_` for `-`. Values are not escaped
beyond the space rule; a value holding `"` passes through verbatim.
*/

use serde::Deserialize;
use std::fmt;

use crate::workdir::WorkingDirectory;

/* ---- Values ---- */

/// A single parameter value as it arrives from a tool call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            ParamValue::Bool(b) => *b,
            ParamValue::Int(n) => *n != 0,
            ParamValue::Float(f) => *f != 0.0,
            ParamValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/* ---- Ordered parameter map ---- */

/// Named parameters in insertion order; iteration order is emission order.
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: Vec<(String, Option<ParamValue>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Re-using a name replaces the value in place.
    pub fn insert<V: Into<ParamValue>>(&mut self, name: &str, value: Option<V>) {
        let value = value.map(Into::into);
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
    }

    /// Builder form of `insert`.
    pub fn with<V: Into<ParamValue>>(mut self, name: &str, value: Option<V>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ParamValue>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_ref()))
    }
}

/* ---- Classification ---- */

/// Which parameter names get special treatment. The lists are disjoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgClasses {
    /// Resolved against the working directory.
    pub paths: &'static [&'static str],
    /// Emitted bare when truthy, never negated.
    pub flags: &'static [&'static str],
    /// `--name` / `--no-name` depending on an exact boolean.
    pub toggles: &'static [&'static str],
}

impl ArgClasses {
    pub const fn paths(paths: &'static [&'static str]) -> Self {
        Self {
            paths,
            flags: &[],
            toggles: &[],
        }
    }
}

/// `save_to` -> `save-to`
pub fn kebab(name: &str) -> String {
    name.replace('_', "-")
}

/// Build the final argv: `base` followed by one token per emitted parameter.
pub fn build_command_args(
    base: &[String],
    params: &Params,
    classes: &ArgClasses,
    workdir: &WorkingDirectory,
) -> Vec<String> {
    let mut out = base.to_vec();

    for (name, value) in params.iter() {
        let Some(value) = value else {
            continue;
        };
        let flag = kebab(name);

        if classes.flags.contains(&name) {
            if value.is_truthy() {
                out.push(format!("--{flag}"));
            }
            continue;
        }

        if classes.toggles.contains(&name) {
            match value {
                ParamValue::Bool(true) => out.push(format!("--{flag}")),
                ParamValue::Bool(false) => out.push(format!("--no-{flag}")),
                _ => {}
            }
            continue;
        }

        if classes.paths.contains(&name) && value.is_truthy() {
            let resolved = workdir.resolve(value.to_string());
            out.push(format!("--{flag}={}", resolved.display()));
            continue;
        }

        match value {
            ParamValue::Text(s) if s.contains(' ') => out.push(format!("--{flag}=\"{s}\"")),
            other => out.push(format!("--{flag}={other}")),
        }
    }

    out
}

/* ---- Tests ---- */
