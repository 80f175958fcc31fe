//! Shared state of one run: the scan domain and the coordinator atomics.

use core::{ops::Range, sync::atomic::Ordering};

use crossbeam_utils::CachePadded;

use crate::{
    collections::HugeAtomicArray, concurrency::atomic::GhostAtomicU64, graph::NodeId,
    token::GhostToken,
};

/// The offsets tasks scan during a wave.
pub(crate) enum ScanDomain<'brand> {
    /// Every node id in `0..node_count`, before any rebuild.
    Full(u64),
    /// Dense array of the node ids that were unassigned at the last rebuild.
    Compacted(HugeAtomicArray<'brand, u64>),
}

impl<'brand> ScanDomain<'brand> {
    /// Number of offsets.
    #[inline]
    pub(crate) fn len(&self) -> u64 {
        match self {
            Self::Full(node_count) => *node_count,
            Self::Compacted(ids) => ids.len(),
        }
    }

    /// Node id at `offset`.
    #[inline(always)]
    pub(crate) fn node_at(&self, offset: u64) -> NodeId {
        match self {
            Self::Full(_) => offset,
            Self::Compacted(ids) => ids.get(offset),
        }
    }
}

/// The coordinator atomics.
///
/// - `next_index`: next unclaimed offset into the scan domain
/// - `current_core`: the peeling threshold `k`, only advanced between waves
/// - `remaining`: nodes not yet finalized, strictly decreasing
/// - `smallest_pending`: smallest residual degree above `k` a scan observed
///
/// Each hot counter sits on its own cache line.
pub(crate) struct WorkCoordinator<'brand> {
    next_index: CachePadded<GhostAtomicU64<'brand>>,
    remaining: CachePadded<GhostAtomicU64<'brand>>,
    smallest_pending: CachePadded<GhostAtomicU64<'brand>>,
    current_core: GhostAtomicU64<'brand>,
}

impl<'brand> WorkCoordinator<'brand> {
    pub(crate) fn new(_token: &GhostToken<'brand>, node_count: u64) -> Self {
        Self {
            next_index: CachePadded::new(GhostAtomicU64::new(0)),
            remaining: CachePadded::new(GhostAtomicU64::new(node_count)),
            smallest_pending: CachePadded::new(GhostAtomicU64::new(u64::MAX)),
            current_core: GhostAtomicU64::new(0),
        }
    }

    /// Resets the per-wave counters; called by the orchestrator between waves.
    pub(crate) fn start_wave(&self, core: u32) {
        self.next_index.store(0, Ordering::Relaxed);
        self.smallest_pending.store(u64::MAX, Ordering::Relaxed);
        self.current_core.store(u64::from(core), Ordering::Release);
    }

    /// The threshold of the running wave.
    #[inline]
    pub(crate) fn current_core(&self) -> u32 {
        self.current_core.load(Ordering::Acquire) as u32
    }

    /// Claims the next batch of scan-domain offsets.
    #[inline]
    pub(crate) fn claim(&self, batch: u64, domain_len: u64) -> Option<Range<u64>> {
        self.next_index.claim(batch, domain_len)
    }

    /// Records `count` finalizations.
    #[inline]
    pub(crate) fn finalized(&self, count: u64) {
        self.remaining.count_down(count);
    }

    /// Nodes not yet finalized.
    #[inline]
    pub(crate) fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }

    /// Offers a residual degree observed above the threshold.
    #[inline]
    pub(crate) fn offer_pending_degree(&self, degree: u32) {
        self.smallest_pending
            .fetch_min(u64::from(degree), Ordering::Relaxed);
    }

    /// Smallest residual degree offered during the wave, if any.
    pub(crate) fn smallest_pending_degree(&self) -> Option<u32> {
        match self.smallest_pending.load(Ordering::Relaxed) {
            u64::MAX => None,
            degree => Some(degree as u32),
        }
    }
}
