//! Loki control for Chaos Toolkit experiments
//!
//! Registers a run event handler with the experiment engine and forwards
//! every lifecycle transition as one labelled record to Grafana Loki.
//! Delivery is fire-and-forget: a failed push is logged locally and never
//! reaches the experiment.

pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod listener;
pub mod payload;
pub mod registry;
pub mod services;
pub mod tags;
pub mod traits;

// Re-export commonly used types
pub use config::{LokiConfig, DEFAULT_LOKI_URL};
pub use control::{configure_control, configure_control_with_transport, LokiControl};
pub use error::{LokiError, LokiResult};
pub use events::{HypothesisPhase, LifecycleEvent};
pub use listener::LokiRunEventHandler;
pub use payload::PushRequest;
pub use registry::HandlerRegistry;
pub use services::{EventSink, RealLokiTransport};
pub use tags::{TagSet, TagValue};
pub use traits::{EventRegistry, LokiTransport, MockLokiTransport, RunEventHandler};
