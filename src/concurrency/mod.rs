//! Concurrency building blocks for superstep execution.
//!
//! Work is organized in *waves*: a fixed set of tasks runs on the worker pool and
//! the orchestrator resumes only after every task has returned. Inside a wave the
//! only shared mutable state is atomic; no locks are taken.

pub mod atomic;
pub mod partition;
pub mod pool;
pub mod termination;

pub use partition::range_partition;
pub use pool::WorkerPool;
pub use termination::TerminationFlag;
