//! Command-line entry point for the k6 actions and probes
//!
//! Exit code 0 when the run succeeded, 1 when it reported failure, 2 when it
//! could not be carried out.

use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use k6::{
    http, run_script, stress_endpoint, HttpProbe, K6Config, K6Result, RealProcessRunner, RunScriptOptions, Stage,
    StressOptions,
};
use shared::{component_debug, component_warn, logging, Component};

/// Drive Grafana k6 load tests
#[derive(Parser)]
#[command(name = "chaos-k6")]
#[command(about = "Run Grafana k6 load tests and probes for chaos experiments")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run an arbitrary k6 script
    Run(RunArgs),
    /// Stress a single endpoint
    Stress(StressArgs),
    /// Probe an endpoint for an expected HTTP status
    Probe(ProbeArgs),
}

#[derive(ClapArgs)]
pub struct RunArgs {
    /// Path to the k6 script
    #[arg(long)]
    pub script: String,

    /// Virtual users
    #[arg(long, default_value = "1")]
    pub vus: u32,

    /// Duration such as 1h2m3s
    #[arg(long, default_value = "1s")]
    pub duration: String,

    /// Ramp stage as <duration>:<target>, repeatable
    #[arg(long = "stage")]
    pub stages: Vec<Stage>,

    /// Run a fixed number of iterations
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Write k6 output to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Show k6 output on this terminal
    #[arg(long)]
    pub debug: bool,

    /// Extra environment for the script as KEY=VALUE, repeatable
    #[arg(long = "env", value_parser = parse_key_value)]
    pub environ: Vec<(String, String)>,
}

#[derive(ClapArgs)]
pub struct StressArgs {
    /// URL of the endpoint, including the scheme
    #[arg(long)]
    pub endpoint: String,

    #[arg(long, default_value = "1")]
    pub vus: u32,

    #[arg(long, default_value = "1s")]
    pub duration: String,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long)]
    pub debug: bool,
}

#[derive(ClapArgs)]
pub struct ProbeArgs {
    /// URL of the endpoint to probe
    #[arg(long)]
    pub endpoint: String,

    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Expected response status
    #[arg(long, default_value = "200")]
    pub status: u16,

    #[arg(long, default_value = "")]
    pub body: String,

    /// Request header as NAME=VALUE, repeatable
    #[arg(long = "header", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,

    #[arg(long, default_value = "1")]
    pub vus: u32,

    #[arg(long, default_value = "")]
    pub duration: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "1")]
    pub timeout: u32,

    #[arg(long)]
    pub debug: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

impl From<RunArgs> for RunScriptOptions {
    fn from(args: RunArgs) -> Self {
        RunScriptOptions {
            script_path: args.script,
            vus: Some(args.vus),
            duration: Some(args.duration),
            stages: Some(args.stages),
            iterations: args.iterations,
            log_file: args.log_file,
            debug: args.debug,
            environ: args.environ.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }
}

impl From<StressArgs> for StressOptions {
    fn from(args: StressArgs) -> Self {
        StressOptions {
            endpoint: args.endpoint,
            vus: args.vus,
            duration: args.duration,
            log_file: args.log_file,
            debug: args.debug,
        }
    }
}

impl From<ProbeArgs> for HttpProbe {
    fn from(args: ProbeArgs) -> Self {
        HttpProbe {
            endpoint: args.endpoint,
            method: args.method,
            status: args.status,
            body: args.body,
            headers: args
                .headers
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect::<Map<_, _>>(),
            vus: args.vus,
            duration: args.duration,
            timeout: args.timeout,
            debug: args.debug,
        }
    }
}

async fn execute(command: Command, runner: &RealProcessRunner, config: &K6Config) -> K6Result<bool> {
    match command {
        Command::Run(args) => run_script(runner, config, &args.into()).await,
        Command::Stress(args) => stress_endpoint(runner, config, &args.into()).await,
        Command::Probe(args) => http(runner, config, &args.into()).await,
    }
}

/// Load configuration from the environment, then run the command
async fn run(command: Command) -> anyhow::Result<bool> {
    let config = K6Config::from_env()?;
    component_debug!(Component::K6Driver, "Using k6 binary {}", config.binary);
    let runner = RealProcessRunner::from_config(&config);

    Ok(execute(command, &runner, &config).await?)
}

/// 0 on success, 1 when the run reported failure, 2 when it could not be carried out
fn exit_status(outcome: anyhow::Result<bool>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => {
            component_warn!(Component::K6Driver, "k6 run reported failure");
            1
        }
        Err(e) => {
            logging::log_error(Component::K6Driver, "k6 run", &format!("{e:#}"));
            2
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    ExitCode::from(exit_status(run(args.command).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_command(script: &str) -> Command {
        let args = Args::parse_from(["chaos-k6", "run", "--script", script]);
        args.command
    }

    #[test]
    fn test_exit_status_mapping() {
        assert_eq!(exit_status(Ok(true)), 0);
        assert_eq!(exit_status(Ok(false)), 1);
        let config_error = shared::SharedError::invalid_config("CHAOS_K6_STRICT_EXIT", "maybe");
        assert_eq!(exit_status(Err(config_error.into())), 2);
        let spawn_error = k6::K6Error::driver_unavailable("k6", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(exit_status(Err(spawn_error.into())), 2);
    }

    #[tokio::test]
    async fn test_invalid_environment_is_an_error_not_a_failure() {
        std::env::set_var("CHAOS_K6_STRICT_EXIT", "maybe");
        let outcome = run(run_command("x.js")).await;
        std::env::remove_var("CHAOS_K6_STRICT_EXIT");

        assert!(outcome.is_err());
        assert_eq!(exit_status(outcome), 2);
    }

    #[test]
    fn test_stage_and_env_arguments() {
        let args = Args::parse_from([
            "chaos-k6", "run", "--script", "s.js", "--stage", "10m:10", "--stage", "5m:50", "--env", "A=1",
        ]);
        let Command::Run(run_args) = args.command else {
            panic!("expected run subcommand");
        };
        let opts = RunScriptOptions::from(run_args);
        assert_eq!(opts.stages, Some(vec![Stage::new("10m", 10), Stage::new("5m", 50)]));
        assert_eq!(opts.environ["A"], "1");
    }
}
