//! Service implementations
//!
//! The reqwest-backed transport and the sink that owns it.

pub mod sink;
pub mod transport;

#[cfg(test)]
pub mod tests;

pub use sink::EventSink;
pub use transport::RealLokiTransport;
