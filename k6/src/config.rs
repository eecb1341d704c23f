//! k6 driver configuration
//!
//! Defaults suit a k6 binary on `PATH` and the scripts bundled with this
//! crate. `from_env` reads overrides after loading a `.env` file:
//! - `CHAOS_K6_BINARY`: k6 executable name or path
//! - `CHAOS_K6_SCRIPTS_DIR`: directory holding the bundled scripts
//! - `CHAOS_K6_RUN_TIMEOUT`: seconds before a run is killed
//! - `CHAOS_K6_STRICT_EXIT`: `true` to report non-zero exit codes as failure

use std::path::PathBuf;
use std::time::Duration;

use shared::{SharedError, SharedResult};

pub const DEFAULT_BINARY: &str = "k6";
pub const SINGLE_ENDPOINT_SCRIPT: &str = "single-endpoint.js";
pub const PROBE_SCRIPT: &str = "probe.js";

/// Directory of the scripts shipped with this crate
pub fn bundled_scripts_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/scripts"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct K6Config {
    pub binary: String,
    pub scripts_dir: PathBuf,
    /// No limit when unset
    pub timeout: Option<Duration>,
    /// Treat a non-zero exit code as a failed run
    pub fail_on_exit_code: bool,
}

impl Default for K6Config {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            scripts_dir: bundled_scripts_dir(),
            timeout: None,
            fail_on_exit_code: false,
        }
    }
}

impl K6Config {
    pub fn from_env() -> SharedResult<Self> {
        let _ = dotenv::dotenv();

        let mut config = Self::default();
        if let Ok(binary) = std::env::var("CHAOS_K6_BINARY") {
            config.binary = binary;
        }
        if let Ok(dir) = std::env::var("CHAOS_K6_SCRIPTS_DIR") {
            config.scripts_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = std::env::var("CHAOS_K6_RUN_TIMEOUT") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| SharedError::invalid_config("CHAOS_K6_RUN_TIMEOUT", raw.clone()))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Ok(raw) = std::env::var("CHAOS_K6_STRICT_EXIT") {
            config.fail_on_exit_code = raw
                .trim()
                .parse()
                .map_err(|_| SharedError::invalid_config("CHAOS_K6_STRICT_EXIT", raw.clone()))?;
        }
        Ok(config)
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_scripts_dir(mut self, scripts_dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = scripts_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fail_on_exit_code(mut self, fail_on_exit_code: bool) -> Self {
        self.fail_on_exit_code = fail_on_exit_code;
        self
    }

    /// Path of a script in the scripts directory, as passed to k6
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.scripts_dir.join(name)
    }
}
