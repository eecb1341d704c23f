//! One-shot control registration
//!
//! `configure_control` is invoked once per experiment run. It derives the run
//! identifiers, builds the tag set, installs the sink, registers the run event
//! handler with the host and emits the synthetic "started" record.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::LokiConfig;
use crate::error::LokiResult;
use crate::events::LifecycleEvent;
use crate::listener::LokiRunEventHandler;
use crate::services::{EventSink, RealLokiTransport};
use crate::tags::TagSet;
use crate::traits::{EventRegistry, LokiTransport};
use shared::{component_debug, component_info, component_warn, logging, Component, Experiment, Secrets};

pub const SOURCE: &str = "chaostoolkit";
pub const TAG_SOURCE: &str = "source";
pub const TAG_LIB_VERSION: &str = "chaostoolkit_lib_version";
pub const TAG_RUN_ID: &str = "chaostoolkit_run_id";
pub const TAG_EXPERIMENT_REF: &str = "chaostoolkit_experiment_ref";
pub const TAG_EXPERIMENT_TITLE: &str = "chaostoolkit_experiment_title";
pub const TAG_EXPERIMENT_TAGS: &str = "chaostoolkit_experiment_tags";

/// Version reported in the library version tag
pub const LIB_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A live registration: the sink and handler installed for one run
pub struct LokiControl {
    sink: Arc<EventSink>,
    handler: Arc<LokiRunEventHandler>,
    experiment_ref: String,
    trace_id: String,
}

impl LokiControl {
    pub fn sink(&self) -> &Arc<EventSink> {
        &self.sink
    }

    pub fn handler(&self) -> &Arc<LokiRunEventHandler> {
        &self.handler
    }

    pub fn experiment_ref(&self) -> &str {
        &self.experiment_ref
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }
}

/// Stable reference for an experiment descriptor: SHA-256 of its JSON form
pub fn experiment_ref(experiment: &Experiment) -> LokiResult<String> {
    let encoded = serde_json::to_vec(experiment)?;
    Ok(hex::encode(Sha256::digest(&encoded)))
}

/// Fresh random token identifying one run
pub fn new_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Base tags, then experiment-level tags, then caller tags
pub fn build_tags(experiment: &Experiment, caller_tags: &TagSet, experiment_ref: &str, trace_id: &str) -> TagSet {
    let mut tags = TagSet::new()
        .with(TAG_SOURCE, SOURCE)
        .with(TAG_LIB_VERSION, LIB_VERSION)
        .with(TAG_RUN_ID, trace_id)
        .with(TAG_EXPERIMENT_REF, experiment_ref)
        .with(TAG_EXPERIMENT_TITLE, experiment.title.as_str());

    if let Some(experiment_tags) = experiment.tags.as_ref().filter(|t| !t.is_empty()) {
        tags.insert(TAG_EXPERIMENT_TAGS, experiment_tags.join(","));
    }

    tags.merge(caller_tags);
    tags
}

/// Register the Loki control for one experiment run.
///
/// Returns `None` when nothing was registered: the host has no registration
/// facility, or the transport could not be set up. Neither case fails the
/// experiment.
pub async fn configure_control(
    experiment: &Experiment,
    secrets: Option<&Secrets>,
    event_registry: Option<&dyn EventRegistry>,
    config: LokiConfig,
) -> Option<LokiControl> {
    component_debug!(Component::LokiControl, "Add Loki handler for {}", config.push_url());

    let auth = secrets.and_then(|s| s.auth.clone());
    if auth.is_none() {
        component_debug!(Component::LokiControl, "No auth secret provided, pushing without credentials");
    }

    let transport = match RealLokiTransport::from_config(&config, auth) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            logging::log_error(Component::LokiControl, "Loki transport setup", &e);
            return None;
        }
    };

    configure_control_with_transport(experiment, event_registry, config, transport).await
}

/// Same as [`configure_control`] with an injected transport
pub async fn configure_control_with_transport(
    experiment: &Experiment,
    event_registry: Option<&dyn EventRegistry>,
    config: LokiConfig,
    transport: Arc<dyn LokiTransport>,
) -> Option<LokiControl> {
    let Some(registry) = event_registry else {
        component_warn!(
            Component::LokiControl,
            "Host provides no event registry, Loki control not registered"
        );
        return None;
    };

    let experiment_ref = match config.experiment_ref.clone() {
        Some(reference) => reference,
        None => match experiment_ref(experiment) {
            Ok(reference) => reference,
            Err(e) => {
                logging::log_error(Component::LokiControl, "Experiment reference derivation", &e);
                return None;
            }
        },
    };
    let trace_id = config.trace_id.clone().unwrap_or_else(new_trace_id);

    let tags = build_tags(experiment, &config.tags, &experiment_ref, &trace_id);
    let sink = Arc::new(EventSink::new(transport, tags));
    let handler = Arc::new(LokiRunEventHandler::new(sink.clone()));
    registry.register(handler.clone());

    component_info!(
        Component::LokiControl,
        trace_id = %trace_id,
        experiment_ref = %experiment_ref,
        "Loki control registered for '{}'",
        experiment.title
    );

    handler
        .forward(LifecycleEvent::Started {
            title: experiment.title.clone(),
        })
        .await;

    Some(LokiControl {
        sink,
        handler,
        experiment_ref,
        trace_id,
    })
}
