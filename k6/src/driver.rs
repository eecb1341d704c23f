//! Grafana k6 driver
//!
//! Collects options for one `k6 run --quiet` invocation and hands the
//! resolved command to a `ProcessRunner`.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use crate::config::K6Config;
use crate::error::K6Result;
use crate::invocation::{Invocation, OutputTarget};
use crate::options::{CommandBuilder, OptionSpec};
use crate::traits::ProcessRunner;

/// Subcommand and flags preceding the rendered options
pub const RUN_ARGS: [&str; 2] = ["run", "--quiet"];

#[derive(Clone, Debug)]
pub struct K6 {
    binary: String,
    debug: bool,
    log_file: Option<PathBuf>,
    environ: BTreeMap<String, String>,
    options: CommandBuilder,
}

impl K6 {
    pub fn new(config: &K6Config) -> Self {
        Self {
            binary: config.binary.clone(),
            debug: false,
            log_file: None,
            environ: BTreeMap::new(),
            options: CommandBuilder::new(),
        }
    }

    /// Show k6 output on the parent's terminal (fluent API)
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Write k6 output to this file (fluent API)
    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    /// Environment overlay for the child (fluent API)
    pub fn with_environ(mut self, environ: BTreeMap<String, String>) -> Self {
        self.environ = environ;
        self
    }

    pub fn add_options<I>(&mut self, options: I) -> &mut Self
    where
        I: IntoIterator<Item = OptionSpec>,
    {
        self.options.extend(options);
        self
    }

    pub fn options(&self) -> &CommandBuilder {
        &self.options
    }

    /// `<binary> run --quiet <options...> <script>`
    pub fn invocation(&self, script: impl AsRef<OsStr>) -> Invocation {
        let args = RUN_ARGS
            .iter()
            .map(OsString::from)
            .chain(self.options.render().into_iter().map(OsString::from))
            .chain(std::iter::once(script.as_ref().to_os_string()));

        Invocation::new(self.binary.clone(), args)
            .with_env(self.environ.clone())
            .with_output(OutputTarget::select(self.debug, self.log_file.as_deref()))
    }

    pub async fn run_script(&self, runner: &dyn ProcessRunner, script: impl AsRef<OsStr>) -> K6Result<bool> {
        let invocation = self.invocation(script);
        runner.run(invocation).await
    }
}
