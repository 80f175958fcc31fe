use serde::Serialize;

use crate::{collections::HugeArray, graph::NodeId};

/// Counters describing how a run progressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KCoreStats {
    /// Peeling waves launched, productive or not.
    pub waves: u64,
    /// Waves that finalized at least one node.
    pub productive_waves: u64,
    /// Scan-domain compactions.
    pub rebuilds: u64,
    /// Length of the scan domain used by the last wave.
    pub final_scan_len: u64,
}

/// Output of a decomposition: one core number per node plus the degeneracy.
pub struct KCoreResult {
    core_values: HugeArray<u32>,
    degeneracy: Option<u32>,
    stats: KCoreStats,
}

impl KCoreResult {
    pub(crate) fn new(
        core_values: HugeArray<u32>,
        degeneracy: Option<u32>,
        stats: KCoreStats,
    ) -> Self {
        Self {
            core_values,
            degeneracy,
            stats,
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            core_values: HugeArray::from_pages(Vec::new(), 0),
            degeneracy: None,
            stats: KCoreStats::default(),
        }
    }

    /// Core number of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a node of the decomposed graph.
    #[inline]
    pub fn core_value(&self, node: NodeId) -> u32 {
        self.core_values.get(node)
    }

    /// The largest core number, or `None` for a graph without nodes.
    pub fn degeneracy(&self) -> Option<u32> {
        self.degeneracy
    }

    /// Core numbers indexed by node id.
    pub fn core_values(&self) -> &HugeArray<u32> {
        &self.core_values
    }

    /// Takes the core numbers out of the result.
    pub fn into_core_values(self) -> HugeArray<u32> {
        self.core_values
    }

    /// Nodes of the `k`-core, i.e. every node whose core number is at least `k`.
    pub fn nodes_in_core(&self, k: u32) -> Vec<NodeId> {
        self.core_values
            .iter()
            .enumerate()
            .filter(|&(_, core)| core >= k)
            .map(|(node, _)| node as NodeId)
            .collect()
    }

    /// Progress counters of the run.
    pub fn stats(&self) -> KCoreStats {
        self.stats
    }
}

impl core::fmt::Debug for KCoreResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KCoreResult")
            .field("node_count", &self.core_values.len())
            .field("degeneracy", &self.degeneracy)
            .field("stats", &self.stats)
            .finish()
    }
}
