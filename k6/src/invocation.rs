//! A fully resolved child process invocation

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where child stdout and stderr go
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    /// Both streams discarded
    Discard,
    /// Both streams written to this file, truncated first
    File(PathBuf),
    /// Both streams shown on the parent's terminal
    Inherit,
}

impl OutputTarget {
    /// Debug mode wins over a log file; neither means discard
    pub fn select(debug: bool, log_file: Option<&Path>) -> Self {
        match (debug, log_file) {
            (true, _) => OutputTarget::Inherit,
            (false, Some(path)) => OutputTarget::File(path.to_path_buf()),
            (false, None) => OutputTarget::Discard,
        }
    }
}

/// Program, arguments, environment overlay and output destination of one run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    /// Paths are passed through untouched, so arguments need not be UTF-8
    pub args: Vec<OsString>,
    /// Sparse overlay applied on top of the inherited environment
    pub env: BTreeMap<String, String>,
    pub output: OutputTarget,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
            output: OutputTarget::Discard,
        }
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    /// Program and arguments joined for display
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Apply `overlay` on top of `inherited`; overlay keys win, inherited-only keys stay
pub fn resolve_env<I>(inherited: I, overlay: &BTreeMap<String, String>) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: BTreeMap<String, String> = inherited.into_iter().collect();
    env.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
}
