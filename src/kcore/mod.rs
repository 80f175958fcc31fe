//! Parallel k-core decomposition.
//!
//! The core number of a node is the largest `k` such that the node belongs to a
//! subgraph in which every node has degree at least `k`. The decomposition peels
//! the graph level by level: at threshold `k` every node whose residual degree is
//! at most `k` receives core number `k` and leaves the graph, lowering the degree
//! of its neighbours, until nothing at or below `k` is left.
//!
//! ## Moving parts
//!
//! | Part | Shared state | Role |
//! |---|---|---|
//! | degree tracker | `HugeAtomicArray<u32>` | residual degree per node |
//! | core values | `HugeAtomicArray<u32>` | [`UNASSIGNED`] until finalized, then written once |
//! | work coordinator | padded atomics | batch cursor, threshold, remaining count |
//! | decomposition task | private stack | scan a batch, peel, repeat |
//! | rebuild task | private queue | compact the scan domain |
//!
//! Every piece of per-run state is branded with the run's
//! [`GhostToken`](crate::token::GhostToken), and the output escapes the brand only
//! as a frozen [`HugeArray`](crate::collections::HugeArray).

mod config;
mod coordinator;
mod decomposition;
mod degrees;
mod rebuild;
pub mod reference;
mod result;
mod task;

pub use config::{KCoreConfig, RebuildPolicy};
pub use decomposition::KCoreDecomposition;
pub use reference::sequential_core_values;
pub use result::{KCoreResult, KCoreStats};

use crate::{error::KCoreError, graph::Graph};

/// Core value of a node that has not been finalized yet.
///
/// No real core value reaches it: degrees are stored as `u32` and a node's core
/// value never exceeds its degree.
pub const UNASSIGNED: u32 = u32::MAX;

/// Decomposes `graph` on `concurrency` workers with the default configuration.
///
/// ```rust
/// use halo_kcore::{k_core_decomposition, CsrGraph};
///
/// let star = CsrGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]).unwrap();
/// let result = k_core_decomposition(&star, 2).unwrap();
/// assert_eq!(result.degeneracy(), Some(1));
/// ```
pub fn k_core_decomposition<G: Graph>(
    graph: &G,
    concurrency: usize,
) -> Result<KCoreResult, KCoreError> {
    KCoreDecomposition::new(graph, KCoreConfig::default().with_concurrency(concurrency)).compute()
}
