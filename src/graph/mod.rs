//! The graph collaborator consumed by the decomposition.
//!
//! The decomposition never owns or mutates a graph. It needs four things:
//! the node count, a node's static degree, neighbor iteration, and a cheap
//! per-thread handle so workers iterate without sharing cursor state.
//!
//! - [`Graph`]: the trait any graph store implements.
//! - [`CsrGraph`]: an in-memory undirected CSR implementation over paged arrays.

pub mod csr;

pub use csr::{CsrCursor, CsrGraph};

/// Node identifier; dense in `0..node_count`.
pub type NodeId = u64;

/// Read-only undirected adjacency view.
///
/// Adjacency must be symmetric: if `v` appears `c` times among `u`'s neighbors,
/// `u` appears `c` times among `v`'s. A self-loop contributes to a node's own
/// degree but is otherwise ignored by the decomposition.
pub trait Graph: Sync {
    /// Per-thread handle returned by [`Graph::concurrent_copy`].
    type ConcurrentCopy<'g>: Graph + Send
    where
        Self: 'g;

    /// Number of nodes.
    fn node_count(&self) -> u64;

    /// Number of stored adjacency entries.
    fn relationship_count(&self) -> u64;

    /// Static degree of `node`: the number of entries visited by
    /// [`for_each_neighbor`](Graph::for_each_neighbor).
    fn degree(&self, node: NodeId) -> u32;

    /// Calls `visitor` once per adjacency entry of `node`.
    fn for_each_neighbor<F: FnMut(NodeId)>(&self, node: NodeId, visitor: F);

    /// A handle that a single worker thread may iterate independently.
    fn concurrent_copy(&self) -> Self::ConcurrentCopy<'_>;

    /// Returns `true` if the graph has no nodes.
    fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}
