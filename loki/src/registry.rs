//! In-process event handler registry
//!
//! Hosts embedding the control can use this as their registration facility:
//! it keeps handlers in registration order and fans every callback out to
//! all of them.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, RwLock};

use crate::traits::{EventRegistry, RunEventHandler};
use shared::{Activity, ActivityRun, Experiment, HypothesisState, Journal};

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<Vec<Arc<dyn RunEventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Handlers are awaited outside the lock.
    fn snapshot(&self) -> Vec<Arc<dyn RunEventHandler>> {
        match self.handlers.read() {
            Ok(handlers) => handlers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventRegistry for HandlerRegistry {
    fn register(&self, handler: Arc<dyn RunEventHandler>) {
        match self.handlers.write() {
            Ok(mut handlers) => handlers.push(handler),
            Err(poisoned) => poisoned.into_inner().push(handler),
        }
    }
}

#[async_trait]
impl RunEventHandler for HandlerRegistry {
    async fn started(&self, experiment: &Experiment, journal: &Journal) {
        for handler in self.snapshot() {
            handler.started(experiment, journal).await;
        }
    }

    async fn finish(&self, journal: &Journal) {
        for handler in self.snapshot() {
            handler.finish(journal).await;
        }
    }

    async fn interrupted(&self, experiment: &Experiment, journal: &Journal) {
        for handler in self.snapshot() {
            handler.interrupted(experiment, journal).await;
        }
    }

    async fn signal_exit(&self) {
        for handler in self.snapshot() {
            handler.signal_exit().await;
        }
    }

    async fn start_continuous_hypothesis(&self, frequency: u64) {
        for handler in self.snapshot() {
            handler.start_continuous_hypothesis(frequency).await;
        }
    }

    async fn continuous_hypothesis_iteration(&self, iteration_index: u64, state: &Value) {
        for handler in self.snapshot() {
            handler.continuous_hypothesis_iteration(iteration_index, state).await;
        }
    }

    async fn continuous_hypothesis_completed(
        &self,
        experiment: &Experiment,
        journal: &Journal,
        exception: Option<&str>,
    ) {
        for handler in self.snapshot() {
            handler
                .continuous_hypothesis_completed(experiment, journal, exception)
                .await;
        }
    }

    async fn start_hypothesis_before(&self, experiment: &Experiment) {
        for handler in self.snapshot() {
            handler.start_hypothesis_before(experiment).await;
        }
    }

    async fn hypothesis_before_completed(
        &self,
        experiment: &Experiment,
        state: &HypothesisState,
        journal: &Journal,
    ) {
        for handler in self.snapshot() {
            handler.hypothesis_before_completed(experiment, state, journal).await;
        }
    }

    async fn start_hypothesis_after(&self, experiment: &Experiment) {
        for handler in self.snapshot() {
            handler.start_hypothesis_after(experiment).await;
        }
    }

    async fn hypothesis_after_completed(
        &self,
        experiment: &Experiment,
        state: &HypothesisState,
        journal: &Journal,
    ) {
        for handler in self.snapshot() {
            handler.hypothesis_after_completed(experiment, state, journal).await;
        }
    }

    async fn start_method(&self, experiment: &Experiment) {
        for handler in self.snapshot() {
            handler.start_method(experiment).await;
        }
    }

    async fn method_completed(&self, experiment: &Experiment, state: &Value) {
        for handler in self.snapshot() {
            handler.method_completed(experiment, state).await;
        }
    }

    async fn start_rollbacks(&self, experiment: &Experiment) {
        for handler in self.snapshot() {
            handler.start_rollbacks(experiment).await;
        }
    }

    async fn rollbacks_completed(&self, experiment: &Experiment, journal: &Journal) {
        for handler in self.snapshot() {
            handler.rollbacks_completed(experiment, journal).await;
        }
    }

    async fn start_cooldown(&self, duration: u64) {
        for handler in self.snapshot() {
            handler.start_cooldown(duration).await;
        }
    }

    async fn cooldown_completed(&self) {
        for handler in self.snapshot() {
            handler.cooldown_completed().await;
        }
    }

    async fn start_activity(&self, activity: &Activity) {
        for handler in self.snapshot() {
            handler.start_activity(activity).await;
        }
    }

    async fn activity_completed(&self, activity: &Activity, run: &ActivityRun) {
        for handler in self.snapshot() {
            handler.activity_completed(activity, run).await;
        }
    }
}
