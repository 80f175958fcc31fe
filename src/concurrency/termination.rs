//! Cooperative cancellation.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::KCoreError;

/// A shared flag that asks a running decomposition to stop.
///
/// Clones observe the same flag. Workers poll it between waves and before each
/// batch claim, so cancellation latency is bounded by one batch.
#[derive(Debug, Clone, Default)]
pub struct TerminationFlag {
    terminated: Arc<AtomicBool>,
}

impl TerminationFlag {
    /// A flag that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while the run may continue.
    #[inline(always)]
    pub fn running(&self) -> bool {
        !self.terminated.load(Ordering::Relaxed)
    }

    /// Raises the flag.
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::Relaxed);
    }

    /// Fails with [`KCoreError::Aborted`] once the flag is raised.
    #[inline]
    pub fn assert_running(&self) -> Result<(), KCoreError> {
        if self.running() {
            Ok(())
        } else {
            Err(KCoreError::Aborted)
        }
    }
}
