//! An undirected CSR (compressed sparse row) graph over paged arrays.
//!
//! Memory layout:
//! - `offsets`: `HugeArray<u64>` of length `n + 1`
//! - `targets`: `HugeArray<u64>` holding every adjacency entry, row by row
//!
//! Both arrays are paged, so neither needs a single allocation of `m` entries.

use crate::{collections::HugeArray, error::KCoreError};

use super::{Graph, NodeId};

/// An immutable undirected graph in CSR form.
///
/// ### Performance Characteristics
/// | Operation | Complexity |
/// |-----------|------------|
/// | `from_edges` | \(O(n + m)\) |
/// | `degree` | \(O(1)\) |
/// | `for_each_neighbor` | \(O(\text{degree})\) |
/// | `concurrent_copy` | \(O(1)\), a shared borrow |
pub struct CsrGraph {
    offsets: HugeArray<u64>,
    targets: HugeArray<u64>,
    node_count: u64,
}

impl CsrGraph {
    /// Builds an undirected graph from an edge list.
    ///
    /// Every edge `(u, v)` is stored as `u -> v` and `v -> u`; a self-loop
    /// `(u, u)` is stored once. Parallel edges are kept.
    ///
    /// # Panics
    ///
    /// Panics if an edge references a node `>= node_count`, or if a node's
    /// degree does not fit in `u32`.
    pub fn from_edges(node_count: u64, edges: &[(NodeId, NodeId)]) -> Result<Self, KCoreError> {
        let mut degrees = HugeArray::<u64>::new(node_count)?;
        for &(u, v) in edges {
            assert!(
                u < node_count && v < node_count,
                "edge {u}--{v} is out of bounds for n={node_count}"
            );
            degrees.set(u, degrees.get(u) + 1);
            if u != v {
                degrees.set(v, degrees.get(v) + 1);
            }
        }

        Self::assemble(node_count, &degrees, |emit| {
            for &(u, v) in edges {
                emit(u, v);
                if u != v {
                    emit(v, u);
                }
            }
        })
    }

    /// Builds a graph from an adjacency list that is already symmetric.
    ///
    /// # Panics
    ///
    /// Panics if any neighbor index is out of bounds, or if a node's degree does
    /// not fit in `u32`.
    pub fn from_adjacency(adjacency: &[Vec<NodeId>]) -> Result<Self, KCoreError> {
        let node_count = adjacency.len() as u64;
        let degrees = HugeArray::<u64>::from_fn(node_count, |u| adjacency[u as usize].len() as u64)?;

        Self::assemble(node_count, &degrees, |emit| {
            for (u, nbrs) in adjacency.iter().enumerate() {
                for &v in nbrs {
                    assert!(v < node_count, "edge {u}->{v} is out of bounds for n={node_count}");
                    emit(u as u64, v);
                }
            }
        })
    }

    fn assemble(
        node_count: u64,
        degrees: &HugeArray<u64>,
        entries: impl FnOnce(&mut dyn FnMut(NodeId, NodeId)),
    ) -> Result<Self, KCoreError> {
        let mut offsets = HugeArray::<u64>::new(node_count + 1)?;
        let mut total = 0u64;
        for u in 0..node_count {
            let degree = degrees.get(u);
            assert!(
                degree < u64::from(u32::MAX),
                "degree {degree} of node {u} does not fit in u32"
            );
            offsets.set(u, total);
            total += degree;
        }
        offsets.set(node_count, total);

        let mut cursor = HugeArray::<u64>::from_fn(node_count, |u| offsets.get(u))?;
        let mut targets = HugeArray::<u64>::new(total)?;
        entries(&mut |u, v| {
            let slot = cursor.get(u);
            targets.set(slot, v);
            cursor.set(u, slot + 1);
        });

        Ok(Self {
            offsets,
            targets,
            node_count,
        })
    }

    /// Estimated bytes for a graph with the given dimensions.
    pub fn memory_estimation(node_count: u64, relationship_count: u64) -> u64 {
        HugeArray::<u64>::memory_estimation(node_count + 1)
            + HugeArray::<u64>::memory_estimation(relationship_count)
    }

    #[inline]
    fn row(&self, node: NodeId) -> core::ops::Range<u64> {
        self.offsets.get(node)..self.offsets.get(node + 1)
    }
}

impl Graph for CsrGraph {
    type ConcurrentCopy<'g> = CsrCursor<'g>
    where
        Self: 'g;

    #[inline]
    fn node_count(&self) -> u64 {
        self.node_count
    }

    #[inline]
    fn relationship_count(&self) -> u64 {
        self.targets.len()
    }

    #[inline]
    fn degree(&self, node: NodeId) -> u32 {
        let row = self.row(node);
        (row.end - row.start) as u32
    }

    #[inline]
    fn for_each_neighbor<F: FnMut(NodeId)>(&self, node: NodeId, visitor: F) {
        self.targets.for_each_in_range(self.row(node), visitor);
    }

    fn concurrent_copy(&self) -> Self::ConcurrentCopy<'_> {
        CsrCursor { graph: self }
    }
}

impl core::fmt::Debug for CsrGraph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CsrGraph")
            .field("node_count", &self.node_count)
            .field("relationship_count", &self.targets.len())
            .finish()
    }
}

/// A worker-local view of a [`CsrGraph`].
///
/// CSR rows are read with plain indexing and carry no cursor state, so the
/// copy is just a shared borrow.
#[derive(Debug, Clone, Copy)]
pub struct CsrCursor<'g> {
    graph: &'g CsrGraph,
}

impl<'g> Graph for CsrCursor<'g> {
    type ConcurrentCopy<'h> = CsrCursor<'h>
    where
        Self: 'h;

    #[inline]
    fn node_count(&self) -> u64 {
        self.graph.node_count
    }

    #[inline]
    fn relationship_count(&self) -> u64 {
        self.graph.relationship_count()
    }

    #[inline]
    fn degree(&self, node: NodeId) -> u32 {
        self.graph.degree(node)
    }

    #[inline]
    fn for_each_neighbor<F: FnMut(NodeId)>(&self, node: NodeId, visitor: F) {
        self.graph.for_each_neighbor(node, visitor);
    }

    fn concurrent_copy(&self) -> Self::ConcurrentCopy<'_> {
        CsrCursor { graph: self.graph }
    }
}
