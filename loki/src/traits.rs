//! Trait definitions for dependency injection
//!
//! `LokiTransport` is the seam between the sink and the network and carries a
//! mockall mock for tests. `RunEventHandler` and `EventRegistry` describe the
//! host experiment engine's side of the contract.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::LokiResult;
use crate::payload::PushRequest;
use shared::{Activity, ActivityRun, Experiment, HypothesisState, Journal};

/// Delivery of push requests to a Loki endpoint
#[mockall::automock]
#[async_trait]
pub trait LokiTransport: Send + Sync {
    /// Deliver one push request
    async fn push(&self, request: &PushRequest) -> LokiResult<()>;
}

/// Lifecycle callbacks fired by the experiment engine
///
/// Every method defaults to a no-op so handlers only implement the phases
/// they care about.
#[async_trait]
pub trait RunEventHandler: Send + Sync {
    async fn started(&self, _experiment: &Experiment, _journal: &Journal) {}

    async fn finish(&self, _journal: &Journal) {}

    async fn interrupted(&self, _experiment: &Experiment, _journal: &Journal) {}

    async fn signal_exit(&self) {}

    async fn start_continuous_hypothesis(&self, _frequency: u64) {}

    async fn continuous_hypothesis_iteration(&self, _iteration_index: u64, _state: &Value) {}

    async fn continuous_hypothesis_completed(
        &self,
        _experiment: &Experiment,
        _journal: &Journal,
        _exception: Option<&str>,
    ) {
    }

    async fn start_hypothesis_before(&self, _experiment: &Experiment) {}

    async fn hypothesis_before_completed(
        &self,
        _experiment: &Experiment,
        _state: &HypothesisState,
        _journal: &Journal,
    ) {
    }

    async fn start_hypothesis_after(&self, _experiment: &Experiment) {}

    async fn hypothesis_after_completed(
        &self,
        _experiment: &Experiment,
        _state: &HypothesisState,
        _journal: &Journal,
    ) {
    }

    async fn start_method(&self, _experiment: &Experiment) {}

    async fn method_completed(&self, _experiment: &Experiment, _state: &Value) {}

    async fn start_rollbacks(&self, _experiment: &Experiment) {}

    async fn rollbacks_completed(&self, _experiment: &Experiment, _journal: &Journal) {}

    async fn start_cooldown(&self, _duration: u64) {}

    async fn cooldown_completed(&self) {}

    async fn start_activity(&self, _activity: &Activity) {}

    async fn activity_completed(&self, _activity: &Activity, _run: &ActivityRun) {}
}

/// Registration facility owned by the experiment engine
pub trait EventRegistry: Send + Sync {
    fn register(&self, handler: Arc<dyn RunEventHandler>);
}
