//! Trait definitions for dependency injection
//!
//! The facades never spawn processes themselves; they hand a resolved
//! `Invocation` to a `ProcessRunner`. Tests swap in the generated mock.

use async_trait::async_trait;

use crate::error::K6Result;
use crate::invocation::Invocation;

/// Runs one child process to completion
#[mockall::automock]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Spawn and await the child described by `invocation`
    ///
    /// # Returns
    /// `Ok(true)` when the run completed, `Ok(false)` when it was cut short or
    /// judged failed, `Err(K6Error::DriverUnavailable)` when it could not start
    async fn run(&self, invocation: Invocation) -> K6Result<bool>;
}
