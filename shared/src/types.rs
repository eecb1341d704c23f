//! Host engine data model
//!
//! The experiment engine owns these structures and hands them to lifecycle
//! callbacks. Only the fields the controls read are typed; the rest is kept
//! as raw JSON so descriptors round-trip untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Journal of a run, opaque to the controls
pub type Journal = Value;

/// Experiment descriptor
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Experiment {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Username/password pair used as transport credentials
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Secret bundle handed to a control at configuration time
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub auth: Option<BasicAuth>,
}

impl Secrets {
    pub fn with_auth(auth: BasicAuth) -> Self {
        Self { auth: Some(auth) }
    }
}

/// Activity declaration (probe or action) as found in the experiment
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Result of one steady-state probe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub activity: Activity,
    pub status: String,
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub tolerance_met: bool,
}

/// Outcome of a steady-state hypothesis evaluation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HypothesisState {
    pub steady_state_met: bool,
    #[serde(default)]
    pub probes: Vec<ProbeResult>,
}

impl HypothesisState {
    /// First probe whose tolerance was not met, if any
    pub fn first_failed_probe(&self) -> Option<&ProbeResult> {
        self.probes.iter().find(|probe| !probe.tolerance_met)
    }
}

/// Completed run of a single activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityRun {
    pub activity: Activity,
    pub status: String,
    pub start: String,
    pub end: String,
    pub duration: f64,
    #[serde(default)]
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_experiment_keeps_unknown_fields() {
        let raw = json!({
            "title": "hello",
            "tags": ["k8s", "api"],
            "method": [{"type": "action", "name": "kill"}]
        });
        let experiment: Experiment = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(experiment.title, "hello");
        assert_eq!(experiment.tags.as_deref(), Some(&["k8s".to_string(), "api".to_string()][..]));
        assert!(experiment.extra.contains_key("method"));
        assert_eq!(serde_json::to_value(&experiment).unwrap(), raw);
    }

    #[test]
    fn test_first_failed_probe_is_first_match() {
        let state: HypothesisState = serde_json::from_value(json!({
            "steady_state_met": false,
            "probes": [
                {"activity": {"name": "ok"}, "status": "succeeded", "output": 200, "tolerance_met": true},
                {"activity": {"name": "first-bad"}, "status": "succeeded", "output": 500, "tolerance_met": false},
                {"activity": {"name": "second-bad"}, "status": "failed", "output": null, "tolerance_met": false}
            ]
        }))
        .unwrap();

        let failed = state.first_failed_probe().unwrap();
        assert_eq!(failed.activity.name, "first-bad");
    }

    #[test]
    fn test_secrets_without_auth() {
        let secrets: Secrets = serde_json::from_value(json!({})).unwrap();
        assert!(secrets.auth.is_none());

        let secrets: Secrets = serde_json::from_value(json!({
            "auth": {"username": "admin", "password": "admin"}
        }))
        .unwrap();
        assert_eq!(secrets.auth, Some(BasicAuth::new("admin", "admin")));
    }
}
