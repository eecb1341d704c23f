//! Load-test actions: run an arbitrary script or stress a single endpoint

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{K6Config, SINGLE_ENDPOINT_SCRIPT};
use crate::driver::K6;
use crate::error::K6Result;
use crate::options::{LoadProfile, OptionSpec, Stage, DURATION_FLAG, VUS_FLAG};
use crate::traits::ProcessRunner;
use shared::{component_info, logging, Component};

/// Environment variable carrying the stressed endpoint
pub const URL_VAR: &str = "CHAOS_K6_URL";

/// Inputs of `run_script`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunScriptOptions {
    pub script_path: String,
    pub vus: Option<u32>,
    pub duration: Option<String>,
    pub stages: Option<Vec<Stage>>,
    pub iterations: Option<u32>,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
    /// Overlay on top of the inherited environment
    pub environ: BTreeMap<String, String>,
}

impl Default for RunScriptOptions {
    fn default() -> Self {
        Self {
            script_path: String::new(),
            vus: Some(1),
            duration: Some("1s".to_string()),
            stages: None,
            iterations: None,
            log_file: None,
            debug: false,
            environ: BTreeMap::new(),
        }
    }
}

impl RunScriptOptions {
    pub fn new(script_path: impl Into<String>) -> Self {
        Self {
            script_path: script_path.into(),
            ..Self::default()
        }
    }

    pub fn load_profile(&self) -> LoadProfile {
        LoadProfile::select(
            self.vus,
            self.duration.clone(),
            self.stages.clone(),
            self.iterations,
        )
    }
}

/// Run an arbitrary k6 script.
///
/// Stages override vus and duration; iterations override duration only.
pub async fn run_script(
    runner: &dyn ProcessRunner,
    config: &K6Config,
    opts: &RunScriptOptions,
) -> K6Result<bool> {
    component_info!(Component::K6Driver, "Running {}", opts.script_path);

    let mut driver = K6::new(config)
        .with_debug(opts.debug)
        .with_log_file(opts.log_file.clone())
        .with_environ(opts.environ.clone());
    driver.add_options(opts.load_profile().options());

    driver.run_script(runner, &opts.script_path).await
}

/// Inputs of `stress_endpoint`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StressOptions {
    pub endpoint: String,
    pub vus: u32,
    pub duration: String,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
}

impl StressOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            vus: 1,
            duration: "1s".to_string(),
            log_file: None,
            debug: false,
        }
    }

    pub fn with_vus(mut self, vus: u32) -> Self {
        self.vus = vus;
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_log_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = Some(log_file.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Stress one endpoint with the bundled single-endpoint script
pub async fn stress_endpoint(
    runner: &dyn ProcessRunner,
    config: &K6Config,
    opts: &StressOptions,
) -> K6Result<bool> {
    component_info!(
        Component::K6Driver,
        "Stressing the endpoint \"{}\" with {} VUs for {}.",
        opts.endpoint,
        opts.vus,
        opts.duration
    );

    let environ = BTreeMap::from([(URL_VAR.to_string(), opts.endpoint.clone())]);
    let mut driver = K6::new(config)
        .with_debug(opts.debug)
        .with_log_file(opts.log_file.clone())
        .with_environ(environ);
    driver.add_options([
        OptionSpec::value(VUS_FLAG, opts.vus),
        OptionSpec::value(DURATION_FLAG, &opts.duration),
    ]);

    let result = driver
        .run_script(runner, &config.script_path(SINGLE_ENDPOINT_SCRIPT))
        .await?;

    logging::log_success(Component::K6Driver, "Stressing completed.");
    if let Some(log_file) = &opts.log_file {
        component_info!(Component::K6Driver, "Logged K6 output to {}.", log_file.display());
    }
    Ok(result)
}
