use crate::{
    collections::{HugeAtomicArray, PagedStack},
    concurrency::TerminationFlag,
    graph::{Graph, NodeId},
};

use super::{
    coordinator::{ScanDomain, WorkCoordinator},
    degrees::DegreeTracker,
    UNASSIGNED,
};

/// One worker's share of a peeling wave.
///
/// A task alternates between two phases until the scan domain is exhausted:
///
/// 1. **scan**: claim a batch of offsets and push every unassigned node whose
///    residual degree is at most `k`; remember the smallest degree above `k`
/// 2. **act**: pop nodes, finalize each with a CAS from [`UNASSIGNED`] to `k`,
///    and decrement its unassigned neighbours. A neighbour whose degree drops
///    to exactly `k` is pushed by the task that caused the drop.
///
/// The stack is fully drained before the next claim, so it never holds the
/// same node twice and `node_count` bounds its length.
pub(crate) struct DecompositionTask<'a, 'brand, G: Graph + 'a> {
    graph: G::ConcurrentCopy<'a>,
    examination_stack: PagedStack<NodeId>,
    degrees: &'a DegreeTracker<'brand>,
    cores: &'a HugeAtomicArray<'brand, u32>,
    coordinator: &'a WorkCoordinator<'brand>,
    termination: &'a TerminationFlag,
    batch_size: u64,
    finalized: u64,
}

impl<'a, 'brand, G: Graph + 'a> DecompositionTask<'a, 'brand, G> {
    pub(crate) fn new(
        graph: &'a G,
        degrees: &'a DegreeTracker<'brand>,
        cores: &'a HugeAtomicArray<'brand, u32>,
        coordinator: &'a WorkCoordinator<'brand>,
        termination: &'a TerminationFlag,
        batch_size: u64,
    ) -> Self {
        Self {
            examination_stack: PagedStack::with_capacity(graph.node_count()),
            graph: graph.concurrent_copy(),
            degrees,
            cores,
            coordinator,
            termination,
            batch_size,
            finalized: 0,
        }
    }

    /// Runs one wave over `domain` at the coordinator's current threshold.
    pub(crate) fn run_wave(&mut self, domain: &ScanDomain<'brand>) {
        let k = self.coordinator.current_core();
        let domain_len = domain.len();
        let mut smallest_pending = u32::MAX;

        while self.termination.running() {
            let Some(batch) = self.coordinator.claim(self.batch_size, domain_len) else {
                break;
            };
            for offset in batch {
                let node = domain.node_at(offset);
                if self.cores.get(node) != UNASSIGNED {
                    continue;
                }
                let degree = self.degrees.degree(node);
                if degree <= k {
                    self.examination_stack.push(node);
                } else {
                    smallest_pending = smallest_pending.min(degree);
                }
            }
            self.drain(k);
        }

        if smallest_pending != u32::MAX {
            self.coordinator.offer_pending_degree(smallest_pending);
        }
    }

    fn drain(&mut self, k: u32) {
        let cores = self.cores;
        let degrees = self.degrees;
        let stack = &mut self.examination_stack;
        let mut finalized = 0u64;

        while let Some(node) = stack.pop() {
            if !cores.compare_and_set(node, UNASSIGNED, k) {
                continue;
            }
            finalized += 1;
            self.graph.for_each_neighbor(node, |neighbor| {
                if cores.get(neighbor) != UNASSIGNED {
                    return;
                }
                if degrees.decrement(neighbor) == k {
                    stack.push(neighbor);
                }
            });
        }

        if finalized > 0 {
            self.coordinator.finalized(finalized);
            self.finalized += finalized;
        }
    }

    /// Nodes this task has finalized so far.
    pub(crate) fn finalized(&self) -> u64 {
        self.finalized
    }

    /// Bytes held by the examination stack's allocated pages.
    pub(crate) fn stack_bytes(&self) -> u64 {
        self.examination_stack.allocated_bytes()
    }
}
