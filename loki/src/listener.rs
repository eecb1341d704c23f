//! Run event handler translating engine callbacks into Loki records

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::events::{HypothesisPhase, LifecycleEvent};
use crate::services::EventSink;
use crate::traits::RunEventHandler;
use shared::{Activity, ActivityRun, Experiment, HypothesisState, Journal};

/// Forwards every lifecycle callback as exactly one record
pub struct LokiRunEventHandler {
    sink: Arc<EventSink>,
}

impl LokiRunEventHandler {
    pub fn new(sink: Arc<EventSink>) -> Self {
        Self { sink }
    }

    pub async fn forward(&self, event: LifecycleEvent) {
        self.sink.emit(&event.message(), &event.tags()).await;
    }
}

#[async_trait]
impl RunEventHandler for LokiRunEventHandler {
    async fn started(&self, experiment: &Experiment, _journal: &Journal) {
        self.forward(LifecycleEvent::Started {
            title: experiment.title.clone(),
        })
        .await;
    }

    async fn finish(&self, _journal: &Journal) {
        self.forward(LifecycleEvent::Finished).await;
    }

    async fn interrupted(&self, _experiment: &Experiment, _journal: &Journal) {
        self.forward(LifecycleEvent::Interrupted).await;
    }

    async fn signal_exit(&self) {
        self.forward(LifecycleEvent::ExitSignal).await;
    }

    async fn start_continuous_hypothesis(&self, frequency: u64) {
        self.forward(LifecycleEvent::ContinuousHypothesisStarted { frequency })
            .await;
    }

    async fn continuous_hypothesis_iteration(&self, iteration_index: u64, _state: &Value) {
        self.forward(LifecycleEvent::ContinuousHypothesisIteration {
            index: iteration_index,
        })
        .await;
    }

    async fn continuous_hypothesis_completed(
        &self,
        _experiment: &Experiment,
        _journal: &Journal,
        exception: Option<&str>,
    ) {
        self.forward(LifecycleEvent::ContinuousHypothesisCompleted {
            exception: exception.map(str::to_string),
        })
        .await;
    }

    async fn start_hypothesis_before(&self, _experiment: &Experiment) {
        self.forward(LifecycleEvent::HypothesisStarted {
            phase: HypothesisPhase::Before,
        })
        .await;
    }

    async fn hypothesis_before_completed(
        &self,
        _experiment: &Experiment,
        state: &HypothesisState,
        _journal: &Journal,
    ) {
        self.forward(LifecycleEvent::hypothesis_completed(HypothesisPhase::Before, state))
            .await;
    }

    async fn start_hypothesis_after(&self, _experiment: &Experiment) {
        self.forward(LifecycleEvent::HypothesisStarted {
            phase: HypothesisPhase::After,
        })
        .await;
    }

    async fn hypothesis_after_completed(
        &self,
        _experiment: &Experiment,
        state: &HypothesisState,
        _journal: &Journal,
    ) {
        self.forward(LifecycleEvent::hypothesis_completed(HypothesisPhase::After, state))
            .await;
    }

    async fn start_method(&self, _experiment: &Experiment) {
        self.forward(LifecycleEvent::MethodStarted).await;
    }

    async fn method_completed(&self, _experiment: &Experiment, _state: &Value) {
        self.forward(LifecycleEvent::MethodCompleted).await;
    }

    async fn start_rollbacks(&self, _experiment: &Experiment) {
        self.forward(LifecycleEvent::RollbacksStarted).await;
    }

    async fn rollbacks_completed(&self, _experiment: &Experiment, _journal: &Journal) {
        self.forward(LifecycleEvent::RollbacksCompleted).await;
    }

    async fn start_cooldown(&self, duration: u64) {
        self.forward(LifecycleEvent::CooldownStarted { duration }).await;
    }

    async fn cooldown_completed(&self) {
        self.forward(LifecycleEvent::CooldownCompleted).await;
    }

    async fn start_activity(&self, activity: &Activity) {
        self.forward(LifecycleEvent::ActivityStarted {
            name: activity.name.clone(),
        })
        .await;
    }

    async fn activity_completed(&self, _activity: &Activity, run: &ActivityRun) {
        self.forward(LifecycleEvent::activity_finished(run)).await;
    }
}
