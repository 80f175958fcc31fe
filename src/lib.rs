//! # `halo-kcore` - Parallel k-core decomposition
//!
//! Computes the core number of every node of an undirected graph, and the
//! graph's degeneracy, on a fixed pool of worker threads. Shared state is a
//! handful of paged atomic arrays plus a few padded counters; no locks are
//! taken while peeling.
//!
//! ## Guarantees
//!
//! - **Deterministic output**: core numbers do not depend on thread count, batch
//!   size, rebuild policy or scheduling.
//! - **Write-once finalization**: a node's core number is set by exactly one
//!   compare-and-swap and never changes afterwards.
//! - **Bounded memory**: every allocation is a paged array whose size is known
//!   up front, so a run can be estimated, and refused, before it starts.
//! - **Branded run state**: all mutable state of a run carries the run's
//!   `GhostToken<'brand>`, so state of one run cannot leak into another.
//!
//! ## Architecture
//!
//! 1. **Paged storage** ([`collections`]): `HugeArray`, `HugeAtomicArray` and
//!    `PagedStack` split node-indexed data into `2^14`-element pages.
//! 2. **Wave execution** ([`concurrency`]): a rayon pool runs one task per worker
//!    and joins them; the join is the only synchronization point.
//! 3. **Graph collaborator** ([`graph`]): any store implementing [`Graph`]; an
//!    in-memory [`CsrGraph`] is included.
//! 4. **Decomposition** ([`kcore`]): the orchestrator, peeling tasks and the
//!    scan-domain compaction.
//! 5. **Memory estimation** ([`memory`]): byte ranges for a run, by component.
//!
//! ## Example
//!
//! ```rust
//! use halo_kcore::{CsrGraph, KCoreConfig, KCoreDecomposition};
//!
//! // Two triangles joined by the bridge 2 - 3.
//! let graph = CsrGraph::from_edges(
//!     6,
//!     &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)],
//! )
//! .unwrap();
//!
//! let result = KCoreDecomposition::new(&graph, KCoreConfig::default())
//!     .compute()
//!     .unwrap();
//! assert_eq!(result.core_values().to_vec(), vec![2; 6]);
//! assert_eq!(result.degeneracy(), Some(2));
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

pub mod collections;
pub mod concurrency;
pub mod error;
pub mod graph;
pub mod kcore;
pub mod memory;
pub mod token;

pub use collections::{HugeArray, HugeAtomicArray, PagedStack};
pub use concurrency::{TerminationFlag, WorkerPool};
pub use error::KCoreError;
pub use graph::{CsrGraph, Graph, NodeId};
pub use kcore::{
    k_core_decomposition, sequential_core_values, KCoreConfig, KCoreDecomposition, KCoreResult,
    KCoreStats, RebuildPolicy, UNASSIGNED,
};
pub use memory::{GraphDimensions, MemoryEstimation, MemoryRange, MemoryTree};
pub use token::GhostToken;

// Compile-time layout checks.
const _: () = {
    use core::mem;

    // Tokens and brands are ZSTs.
    assert!(mem::size_of::<GhostToken<'static>>() == 0);
    assert!(mem::size_of::<token::InvariantLifetime<'static>>() == 0);

    // A branded counter is exactly its atomic.
    assert!(
        mem::size_of::<concurrency::atomic::GhostAtomicU64<'static>>()
            == mem::size_of::<core::sync::atomic::AtomicU64>()
    );

    // The sentinel stays out of reach of real core values.
    assert!(UNASSIGNED == u32::MAX);
};
