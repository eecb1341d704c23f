//! Tests for the real process runner
//!
//! These spawn `sh` in place of k6, so they only run on unix hosts.
