use core::{
    ops::Range,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::token::InvariantLifetime;

/// A branded `AtomicU64` counter.
///
/// The brand ties the counter to one decomposition run; it does **not** affect
/// the atomic's concurrency behavior.
#[repr(transparent)]
pub struct GhostAtomicU64<'brand> {
    inner: AtomicU64,
    _brand: InvariantLifetime<'brand>,
}

impl<'brand> GhostAtomicU64<'brand> {
    /// Creates a new counter.
    #[inline(always)]
    pub const fn new(value: u64) -> Self {
        Self {
            inner: AtomicU64::new(value),
            _brand: InvariantLifetime::new(),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> u64 {
        self.inner.load(order)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: u64, order: Ordering) {
        self.inner.store(value, order);
    }

    /// Adds to the current value, returning the previous value.
    #[inline(always)]
    pub fn fetch_add(&self, value: u64, order: Ordering) -> u64 {
        self.inner.fetch_add(value, order)
    }

    /// Lowers the value to `value` if it is smaller, returning the previous value.
    #[inline(always)]
    pub fn fetch_min(&self, value: u64, order: Ordering) -> u64 {
        self.inner.fetch_min(value, order)
    }

    /// Subtracts `value`, returning the new value.
    ///
    /// The counter never goes below zero; an underflow is a bookkeeping bug.
    #[inline]
    pub fn count_down(&self, value: u64) -> u64 {
        let previous = self.inner.fetch_sub(value, Ordering::AcqRel);
        debug_assert!(previous >= value, "counter underflow: {previous} - {value}");
        previous - value
    }

    /// Claims the next `batch` offsets below `limit`.
    ///
    /// One `fetch_add` per call; returns `None` once the cursor has passed
    /// `limit`. The last claim is clamped to `limit`.
    #[inline]
    pub fn claim(&self, batch: u64, limit: u64) -> Option<Range<u64>> {
        let start = self.inner.fetch_add(batch, Ordering::Relaxed);
        if start >= limit {
            return None;
        }
        Some(start..start.saturating_add(batch).min(limit))
    }
}

impl core::fmt::Debug for GhostAtomicU64<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("GhostAtomicU64")
            .field(&self.inner.load(Ordering::Relaxed))
            .finish()
    }
}
