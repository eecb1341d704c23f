//! Shared pieces for the Chaos Toolkit Grafana controls and drivers
//!
//! Contains logging setup used by every crate in the workspace, the shared
//! error type, and the host engine data model handed to lifecycle callbacks.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use logging::Component;
pub use types::*;
