//! Grafana k6 driver for Chaos Toolkit experiments
//!
//! Actions and probes compose a `k6 run --quiet` command line plus an
//! environment overlay and hand it to a `ProcessRunner`. Configuration
//! problems are reported before anything is spawned, and a missing k6 binary
//! is a distinct error from a run that reported failure.

pub mod actions;
pub mod config;
pub mod driver;
pub mod error;
pub mod invocation;
pub mod options;
pub mod probes;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use actions::{run_script, stress_endpoint, RunScriptOptions, StressOptions};
pub use config::K6Config;
pub use driver::K6;
pub use error::{K6Error, K6Result};
pub use invocation::{Invocation, OutputTarget};
pub use options::{CommandBuilder, LoadProfile, OptionSpec, Stage};
pub use probes::{http, HttpMethod, HttpProbe};
pub use services::RealProcessRunner;
pub use traits::{MockProcessRunner, ProcessRunner};
