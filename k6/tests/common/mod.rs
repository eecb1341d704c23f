//! Shared helpers for k6 driver tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use k6::{Invocation, K6Config, MockProcessRunner};

/// Config with a fixed scripts directory so expected paths are predictable
pub fn test_config() -> K6Config {
    K6Config::default().with_scripts_dir("/opt/chaosgrafana/scripts")
}

/// Mock runner that records the single invocation it receives
pub fn capturing_runner(result: bool) -> (MockProcessRunner, Arc<Mutex<Option<Invocation>>>) {
    let captured = Arc::new(Mutex::new(None));
    let slot = captured.clone();

    let mut runner = MockProcessRunner::new();
    runner.expect_run().times(1).returning(move |invocation| {
        *slot.lock().unwrap() = Some(invocation);
        Ok(result)
    });

    (runner, captured)
}

/// Mock runner that fails the test if anything is spawned
pub fn forbidden_runner() -> MockProcessRunner {
    let mut runner = MockProcessRunner::new();
    runner.expect_run().times(0);
    runner
}

pub fn take(captured: &Arc<Mutex<Option<Invocation>>>) -> Invocation {
    captured
        .lock()
        .unwrap()
        .take()
        .expect("runner should have been invoked")
}
