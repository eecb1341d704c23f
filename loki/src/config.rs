//! Loki control configuration
//!
//! Values come from the control's arguments in the experiment, with
//! `from_env` as an alternative source for embedding hosts:
//! - `CHAOS_LOKI_ENDPOINT`: base URL of the Loki server
//! - `CHAOS_LOKI_TIMEOUT`: push timeout in seconds
//!
//! A `.env` file in the current or a parent directory is loaded first;
//! variables already set in the environment take precedence.

use std::time::Duration;

use crate::tags::TagSet;
use shared::{SharedError, SharedResult};

pub const DEFAULT_LOKI_URL: &str = "http://localhost:3100";
pub const PUSH_PATH: &str = "/loki/api/v1/push";
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq)]
pub struct LokiConfig {
    /// Base URL of the Loki server
    pub endpoint: String,
    /// Static tags supplied by the caller
    pub tags: TagSet,
    /// Correlates runs of the same experiment; derived when absent
    pub experiment_ref: Option<String>,
    /// Identifies this run; generated when absent
    pub trace_id: Option<String>,
    /// Upper bound for a single push
    pub timeout: Duration,
}

impl Default for LokiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_LOKI_URL.to_string(),
            tags: TagSet::new(),
            experiment_ref: None,
            trace_id: None,
            timeout: DEFAULT_PUSH_TIMEOUT,
        }
    }
}

impl LokiConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Build from `CHAOS_LOKI_*` environment variables
    pub fn from_env() -> SharedResult<Self> {
        let _ = dotenv::dotenv();

        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var("CHAOS_LOKI_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(raw) = std::env::var("CHAOS_LOKI_TIMEOUT") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| SharedError::invalid_config("CHAOS_LOKI_TIMEOUT", raw.clone()))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_experiment_ref(mut self, experiment_ref: Option<String>) -> Self {
        self.experiment_ref = experiment_ref;
        self
    }

    pub fn with_trace_id(mut self, trace_id: Option<String>) -> Self {
        self.trace_id = trace_id;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full push URL for the configured endpoint
    pub fn push_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), PUSH_PATH)
    }
}
