use crate::{
    collections::HugeAtomicArray,
    concurrency::WorkerPool,
    error::KCoreError,
    graph::{Graph, NodeId},
    token::GhostToken,
};

/// Residual degree of every node.
///
/// Starts at the graph degree and only ever decreases, one decrement per
/// finalized neighbour. A node's entry stops changing once it is assigned.
pub(crate) struct DegreeTracker<'brand> {
    degrees: HugeAtomicArray<'brand, u32>,
}

impl<'brand> DegreeTracker<'brand> {
    /// Allocates the tracker and fills it from `graph` on the pool's workers.
    pub(crate) fn initialize<G: Graph>(
        _token: &GhostToken<'brand>,
        graph: &G,
        pool: &WorkerPool,
    ) -> Result<Self, KCoreError> {
        let degrees = HugeAtomicArray::new(graph.node_count(), 0u32)?;
        pool.install(|| {
            degrees.par_fill_with_init(|| graph.concurrent_copy(), |copy, node| copy.degree(node));
        });
        Ok(Self { degrees })
    }

    #[inline]
    pub(crate) fn degree(&self, node: NodeId) -> u32 {
        self.degrees.get(node)
    }

    /// Decrements `node`'s residual degree, returning the new value.
    #[inline]
    pub(crate) fn decrement(&self, node: NodeId) -> u32 {
        let previous = self.degrees.get_and_sub(node, 1);
        debug_assert!(previous > 0, "residual degree of {node} underflowed");
        previous - 1
    }

    pub(crate) fn memory_estimation(node_count: u64) -> u64 {
        HugeAtomicArray::<u32>::memory_estimation(node_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CsrGraph;

    #[test]
    fn starts_at_graph_degree() {
        let graph = CsrGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 1)]).unwrap();
        let pool = WorkerPool::new(2).unwrap();
        GhostToken::new(|token| {
            let tracker = DegreeTracker::initialize(&token, &graph, &pool).unwrap();
            assert_eq!(tracker.degree(0), 3);
            assert_eq!(tracker.degree(1), 2);
            assert_eq!(tracker.degree(3), 1);
            assert_eq!(tracker.decrement(0), 2);
            assert_eq!(tracker.degree(0), 2);
        });
    }
}
