//! Lifecycle events forwarded to Loki
//!
//! One variant per experiment phase transition. Each event knows its `type`
//! discriminator, its human readable line and the tags it overlays on the
//! registration's base tags.

use serde_json::Value;

use crate::tags::TagSet;
use shared::{ActivityRun, HypothesisState, ProbeResult};

pub const TYPE_TAG: &str = "type";

/// Upper bound on the tags a single event adds, `type` included
pub const MAX_EVENT_TAGS: usize = 3;

/// Which steady-state hypothesis evaluation a completion belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HypothesisPhase {
    Before,
    After,
}

impl HypothesisPhase {
    fn as_str(self) -> &'static str {
        match self {
            HypothesisPhase::Before => "before",
            HypothesisPhase::After => "after",
        }
    }
}

/// Probe that broke the steady state
#[derive(Clone, Debug, PartialEq)]
pub struct FailedProbe {
    pub name: String,
    pub status: String,
    pub output: Value,
}

impl From<&ProbeResult> for FailedProbe {
    fn from(probe: &ProbeResult) -> Self {
        Self {
            name: probe.activity.name.clone(),
            status: probe.status.clone(),
            output: probe.output.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LifecycleEvent {
    Started { title: String },
    Finished,
    Interrupted,
    ExitSignal,
    ContinuousHypothesisStarted { frequency: u64 },
    ContinuousHypothesisIteration { index: u64 },
    ContinuousHypothesisCompleted { exception: Option<String> },
    HypothesisStarted { phase: HypothesisPhase },
    HypothesisCompleted {
        phase: HypothesisPhase,
        steady_state_met: bool,
        failed_probe: Option<FailedProbe>,
    },
    MethodStarted,
    MethodCompleted,
    RollbacksStarted,
    RollbacksCompleted,
    CooldownStarted { duration: u64 },
    CooldownCompleted,
    ActivityStarted { name: String },
    ActivityFinished {
        name: String,
        status: String,
        start: String,
        end: String,
        duration: f64,
        output: Value,
        exception: Option<String>,
    },
}

impl LifecycleEvent {
    /// Completion of a before/after hypothesis. Only the first probe that
    /// missed its tolerance is kept, and only when the steady state was not met.
    pub fn hypothesis_completed(phase: HypothesisPhase, state: &HypothesisState) -> Self {
        let failed_probe = if state.steady_state_met {
            None
        } else {
            state.first_failed_probe().map(FailedProbe::from)
        };
        LifecycleEvent::HypothesisCompleted {
            phase,
            steady_state_met: state.steady_state_met,
            failed_probe,
        }
    }

    pub fn activity_finished(run: &ActivityRun) -> Self {
        LifecycleEvent::ActivityFinished {
            name: run.activity.name.clone(),
            status: run.status.clone(),
            start: run.start.clone(),
            end: run.end.clone(),
            duration: run.duration,
            output: run.output.clone(),
            exception: run.exception.clone(),
        }
    }

    /// Value of the `type` tag
    pub fn kind(&self) -> String {
        let kind = match self {
            LifecycleEvent::Started { .. } => "experiment-started",
            LifecycleEvent::Finished => "experiment-finished",
            LifecycleEvent::Interrupted => "experiment-interrupted",
            LifecycleEvent::ExitSignal => "experiment-exit-signal",
            LifecycleEvent::ContinuousHypothesisStarted { .. } => "experiment-continuous-ssh-started",
            LifecycleEvent::ContinuousHypothesisIteration { .. } => "experiment-continuous-ssh-iteration",
            LifecycleEvent::ContinuousHypothesisCompleted { .. } => "experiment-continuous-ssh-completed",
            LifecycleEvent::HypothesisStarted { phase } => {
                return format!("experiment-{}-ssh-started", phase.as_str());
            }
            LifecycleEvent::HypothesisCompleted { phase, .. } => {
                return format!("experiment-{}-ssh-completed", phase.as_str());
            }
            LifecycleEvent::MethodStarted => "experiment-method-started",
            LifecycleEvent::MethodCompleted => "experiment-method-completed",
            LifecycleEvent::RollbacksStarted => "experiment-rollbacks-started",
            LifecycleEvent::RollbacksCompleted => "experiment-rollbacks-completed",
            LifecycleEvent::CooldownStarted { .. } => "experiment-cooldown-started",
            LifecycleEvent::CooldownCompleted => "experiment-cooldown-completed",
            LifecycleEvent::ActivityStarted { .. } => "experiment-activity-started",
            LifecycleEvent::ActivityFinished { .. } => "experiment-activity-finished",
        };
        kind.to_string()
    }

    /// Human readable line pushed to Loki
    pub fn message(&self) -> String {
        match self {
            LifecycleEvent::Started { title } if title.is_empty() => "Experiment started".to_string(),
            LifecycleEvent::Started { title } => format!("Experiment '{title}' started"),
            LifecycleEvent::Finished => "Experiment finished".to_string(),
            LifecycleEvent::Interrupted => "Experiment interrupted".to_string(),
            LifecycleEvent::ExitSignal => "Experiment exit signal received".to_string(),
            LifecycleEvent::ContinuousHypothesisStarted { .. } => {
                "Experiment steady state started running continuously".to_string()
            }
            LifecycleEvent::ContinuousHypothesisIteration { index } => {
                format!("Experiment steady state iteration {index}")
            }
            LifecycleEvent::ContinuousHypothesisCompleted { exception: None } => {
                "Experiment continuous steady state completed".to_string()
            }
            LifecycleEvent::ContinuousHypothesisCompleted { exception: Some(e) } => {
                format!("Experiment continuous steady state completed with error: {e}")
            }
            LifecycleEvent::HypothesisStarted { phase } => {
                format!("Experiment {} steady state started", phase.as_str())
            }
            LifecycleEvent::HypothesisCompleted {
                phase,
                steady_state_met,
                failed_probe,
            } => match (steady_state_met, failed_probe) {
                (true, _) => format!("Experiment {} steady state completed", phase.as_str()),
                (false, Some(probe)) => format!(
                    "Experiment {} steady state completed: deviated on probe '{}' with status {}, output: {}",
                    phase.as_str(),
                    probe.name,
                    probe.status,
                    value_to_string(&probe.output)
                ),
                (false, None) => format!("Experiment {} steady state completed: deviated", phase.as_str()),
            },
            LifecycleEvent::MethodStarted => "Experiment method started".to_string(),
            LifecycleEvent::MethodCompleted => "Experiment method completed".to_string(),
            LifecycleEvent::RollbacksStarted => "Experiment rollbacks started".to_string(),
            LifecycleEvent::RollbacksCompleted => "Experiment rollbacks completed".to_string(),
            LifecycleEvent::CooldownStarted { duration } => {
                format!("Experiment cooldown period started for {duration}s")
            }
            LifecycleEvent::CooldownCompleted => "Experiment cooldown period completed".to_string(),
            LifecycleEvent::ActivityStarted { name } => format!("Activity '{name}' started"),
            LifecycleEvent::ActivityFinished {
                name,
                status,
                start,
                end,
                duration,
                output,
                exception,
            } => {
                let mut line =
                    format!("Activity '{name}' finished with status {status} ({start} to {end}, {duration}s)");
                if !output.is_null() {
                    line.push_str(&format!(", output: {}", value_to_string(output)));
                }
                if let Some(e) = exception {
                    line.push_str(&format!(", exception: {e}"));
                }
                line
            }
        }
    }

    /// Event-specific tags overlaid on the registration tags.
    ///
    /// Only bounded values become labels; timestamps, outputs, exceptions and
    /// iteration counters stay in the line.
    pub fn tags(&self) -> TagSet {
        let mut tags = TagSet::new().with(TYPE_TAG, self.kind());
        match self {
            LifecycleEvent::ContinuousHypothesisStarted { frequency } => {
                tags.insert("frequency", *frequency);
            }
            LifecycleEvent::HypothesisCompleted {
                steady_state_met,
                failed_probe,
                ..
            } => {
                tags.insert("steady_state_met", *steady_state_met);
                if let Some(probe) = failed_probe {
                    tags.insert("failed_probe", probe.name.clone());
                }
            }
            LifecycleEvent::CooldownStarted { duration } => {
                tags.insert("duration", *duration);
            }
            LifecycleEvent::ActivityStarted { name } => {
                tags.insert("activity", name.clone());
            }
            LifecycleEvent::ActivityFinished { name, status, .. } => {
                tags.insert("activity", name.clone()).insert("status", status.clone());
            }
            _ => {}
        }
        tags
    }
}

/// Strings are used verbatim, anything else as compact JSON
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagValue;
    use serde_json::json;
    use shared::Activity;

    fn probe(name: &str, tolerance_met: bool, output: Value) -> ProbeResult {
        ProbeResult {
            activity: Activity::named(name),
            status: "succeeded".to_string(),
            output,
            tolerance_met,
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(LifecycleEvent::Finished.kind(), "experiment-finished");
        assert_eq!(
            LifecycleEvent::HypothesisStarted { phase: HypothesisPhase::After }.kind(),
            "experiment-after-ssh-started"
        );
        assert_eq!(
            LifecycleEvent::ContinuousHypothesisIteration { index: 3 }.kind(),
            "experiment-continuous-ssh-iteration"
        );
        assert_eq!(
            LifecycleEvent::ActivityStarted { name: "x".into() }.kind(),
            "experiment-activity-started"
        );
    }

    #[test]
    fn test_cooldown_tags_and_message() {
        let event = LifecycleEvent::CooldownStarted { duration: 30 };
        let tags = event.tags();
        assert_eq!(tags.get("type"), Some(&TagValue::from("experiment-cooldown-started")));
        assert_eq!(tags.get("duration"), Some(&TagValue::Int(30)));
        assert_eq!(event.message(), "Experiment cooldown period started for 30s");
    }

    #[test]
    fn test_met_hypothesis_carries_no_probe() {
        let state = HypothesisState {
            steady_state_met: true,
            probes: vec![probe("flaky", false, json!(500))],
        };
        let event = LifecycleEvent::hypothesis_completed(HypothesisPhase::Before, &state);
        let tags = event.tags();

        assert_eq!(tags.get("steady_state_met"), Some(&TagValue::Bool(true)));
        assert!(tags.get("failed_probe").is_none());
        assert_eq!(event.message(), "Experiment before steady state completed");
    }

    #[test]
    fn test_deviated_hypothesis_keeps_first_failed_probe_only() {
        let state = HypothesisState {
            steady_state_met: false,
            probes: vec![
                probe("healthy", true, json!(200)),
                probe("api-status", false, json!(503)),
                probe("db-status", false, json!("down")),
            ],
        };
        let event = LifecycleEvent::hypothesis_completed(HypothesisPhase::After, &state);
        let tags = event.tags();

        assert_eq!(tags.get("type"), Some(&TagValue::from("experiment-after-ssh-completed")));
        assert_eq!(tags.get("steady_state_met"), Some(&TagValue::Bool(false)));
        assert_eq!(tags.get("failed_probe"), Some(&TagValue::from("api-status")));
        assert!(tags.get("failed_probe_output").is_none());
        assert_eq!(
            event.message(),
            "Experiment after steady state completed: deviated on probe 'api-status' with status succeeded, output: 503"
        );
        assert!(!event.message().contains("db-status"));
    }

    #[test]
    fn test_activity_finished() {
        let run = ActivityRun {
            activity: Activity::named("stress-api"),
            status: "failed".to_string(),
            start: "2024-01-01T00:00:00".to_string(),
            end: "2024-01-01T00:00:02".to_string(),
            duration: 2.5,
            output: Value::Null,
            exception: Some("k6 not found".to_string()),
        };
        let event = LifecycleEvent::activity_finished(&run);
        let labels = event.tags().to_labels();

        assert_eq!(labels["type"], "experiment-activity-finished");
        assert_eq!(labels["activity"], "stress-api");
        assert_eq!(labels["status"], "failed");
        assert!(!labels.contains_key("start"));
        assert!(!labels.contains_key("end"));
        assert!(!labels.contains_key("duration"));
        assert_eq!(
            event.message(),
            "Activity 'stress-api' finished with status failed \
             (2024-01-01T00:00:00 to 2024-01-01T00:00:02, 2.5s), exception: k6 not found"
        );
    }

    fn all_events() -> Vec<LifecycleEvent> {
        vec![
            LifecycleEvent::Started { title: "t".into() },
            LifecycleEvent::Finished,
            LifecycleEvent::Interrupted,
            LifecycleEvent::ExitSignal,
            LifecycleEvent::ContinuousHypothesisStarted { frequency: 5 },
            LifecycleEvent::ContinuousHypothesisIteration { index: 7 },
            LifecycleEvent::ContinuousHypothesisCompleted {
                exception: Some("boom".into()),
            },
            LifecycleEvent::HypothesisStarted {
                phase: HypothesisPhase::Before,
            },
            LifecycleEvent::HypothesisCompleted {
                phase: HypothesisPhase::After,
                steady_state_met: false,
                failed_probe: Some(FailedProbe {
                    name: "api".into(),
                    status: "failed".into(),
                    output: json!("x".repeat(5000)),
                }),
            },
            LifecycleEvent::MethodStarted,
            LifecycleEvent::MethodCompleted,
            LifecycleEvent::RollbacksStarted,
            LifecycleEvent::RollbacksCompleted,
            LifecycleEvent::CooldownStarted { duration: 30 },
            LifecycleEvent::CooldownCompleted,
            LifecycleEvent::ActivityStarted { name: "a".into() },
            LifecycleEvent::ActivityFinished {
                name: "a".into(),
                status: "succeeded".into(),
                start: "s".into(),
                end: "e".into(),
                duration: 1.0,
                output: json!({"body": "y".repeat(5000)}),
                exception: Some("trace".into()),
            },
        ]
    }

    #[test]
    fn test_event_labels_stay_small() {
        for event in all_events() {
            let labels = event.tags().to_labels();
            assert!(labels.len() <= MAX_EVENT_TAGS, "{} has {} labels", event.kind(), labels.len());
            assert!(
                labels.values().all(|v| v.len() < 256),
                "{} carries an unbounded label value",
                event.kind()
            );
        }
    }

    #[test]
    fn test_payload_tags_and_messages() {
        let cases: Vec<(LifecycleEvent, Option<(&str, TagValue)>, &str)> = vec![
            (
                LifecycleEvent::ContinuousHypothesisStarted { frequency: 10 },
                Some(("frequency", TagValue::Int(10))),
                "Experiment steady state started running continuously",
            ),
            (
                LifecycleEvent::ContinuousHypothesisIteration { index: 4 },
                None,
                "Experiment steady state iteration 4",
            ),
            (LifecycleEvent::Interrupted, None, "Experiment interrupted"),
            (LifecycleEvent::ExitSignal, None, "Experiment exit signal received"),
            (
                LifecycleEvent::ContinuousHypothesisCompleted {
                    exception: Some("probe timed out".into()),
                },
                None,
                "Experiment continuous steady state completed with error: probe timed out",
            ),
            (
                LifecycleEvent::ContinuousHypothesisCompleted { exception: None },
                None,
                "Experiment continuous steady state completed",
            ),
        ];

        for (event, tag, message) in cases {
            let tags = event.tags();
            assert_eq!(event.message(), message);
            assert_eq!(tags.get(TYPE_TAG), Some(&TagValue::from(event.kind())));
            match tag {
                Some((key, value)) => {
                    assert_eq!(tags.get(key), Some(&value));
                    assert_eq!(tags.len(), 2);
                }
                None => assert_eq!(tags.len(), 1, "{} should only carry its type", event.kind()),
            }
        }
    }
}
