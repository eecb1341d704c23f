//! Tests for the Loki control services
//!
//! The sink is exercised against a mocked transport, the reqwest transport
//! against a local wiremock server.
