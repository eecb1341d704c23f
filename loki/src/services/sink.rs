//! Structured record emitter bound to a transport

use std::sync::Arc;

use crate::payload::PushRequest;
use crate::tags::TagSet;
use crate::traits::LokiTransport;
use shared::{component_warn, Component};

pub const LEVEL_TAG: &str = "level";
pub const LOGGER_TAG: &str = "logger";
pub const LOGGER_NAME: &str = "chaostoolkit-loki";

/// Builds one record per emitted line and hands it to the transport.
///
/// The sink owns its tag set for the lifetime of a registration; events only
/// ever overlay tags on a per-record copy.
pub struct EventSink {
    transport: Arc<dyn LokiTransport>,
    tags: TagSet,
}

impl EventSink {
    pub fn new(transport: Arc<dyn LokiTransport>, tags: TagSet) -> Self {
        let mut tags = tags;
        tags.insert(LEVEL_TAG, "info").insert(LOGGER_TAG, LOGGER_NAME);
        Self { transport, tags }
    }

    /// Tags attached to every record
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Build the request for `line` with `extra` merged over the base tags
    pub fn build_request(&self, line: &str, extra: &TagSet) -> PushRequest {
        let mut tags = self.tags.clone();
        tags.merge(extra);
        PushRequest::single(&tags, line)
    }

    /// Push one record. Delivery failures are logged locally and dropped.
    pub async fn emit(&self, line: &str, extra: &TagSet) {
        let request = self.build_request(line, extra);
        if let Err(e) = self.transport.push(&request).await {
            component_warn!(
                Component::LokiControl,
                error = %e,
                "Failed to push experiment event to Loki: {}",
                line
            );
        }
    }
}
