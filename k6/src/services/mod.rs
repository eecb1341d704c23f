//! Service implementations

pub mod process_runner;

#[cfg(test)]
pub mod tests;

pub use process_runner::RealProcessRunner;
