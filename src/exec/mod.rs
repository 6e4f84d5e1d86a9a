mod report;
mod runner;

pub use report::render;
pub use runner::InterpreterLauncher;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Terminal status of a bounded execution.
///
/// `TimedOut` is a distinguished sentinel: it is never produced by normal
/// process termination, so callers can always tell "the code ran and failed"
/// from "the code was killed at the deadline".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The child ran to completion with this exit code.
    Exited(i32),
    /// The wall-clock deadline expired and the child was killed.
    TimedOut,
}

/// Captured outcome of one script execution.
///
/// Produced exactly once per request and immutable after creation.
#[derive(Debug)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub fn timed_out(&self) -> bool {
        self.status == ExitStatus::TimedOut
    }
}

/// Trait for bounded script launchers.
///
/// Abstracts the process launch facility so the execution service can be
/// exercised against a stub in tests.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Launch a materialized script and enforce a hard wall-clock deadline.
    ///
    /// Must free the OS process resource before returning on deadline
    /// expiry; a timed-out request never leaves a child behind.
    async fn run(&self, script: &Path, timeout: Duration) -> Result<ExecutionResult>;
}
