use std::time::Instant;

use crate::{
    collections::{paged::check_capacity, HugeAtomicArray, PagedStack},
    concurrency::{TerminationFlag, WorkerPool},
    error::KCoreError,
    graph::{CsrGraph, Graph},
    memory::{GraphDimensions, MemoryEstimation, MemoryRange, MemoryTree},
    token::GhostToken,
};

use super::{
    config::{KCoreConfig, RebuildPolicy},
    coordinator::{ScanDomain, WorkCoordinator},
    degrees::DegreeTracker,
    rebuild::{self, compact_scan_domain},
    result::{KCoreResult, KCoreStats},
    task::DecompositionTask,
    UNASSIGNED,
};

/// Parallel k-core decomposition of one graph.
///
/// ```rust
/// use halo_kcore::{CsrGraph, KCoreConfig, KCoreDecomposition};
///
/// // A triangle with a pendant node.
/// let graph = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 0), (2, 3)]).unwrap();
/// let result = KCoreDecomposition::new(&graph, KCoreConfig::default().with_concurrency(2))
///     .compute()
///     .unwrap();
///
/// assert_eq!(result.core_values().to_vec(), vec![2, 2, 2, 1]);
/// assert_eq!(result.degeneracy(), Some(2));
/// ```
///
/// ### Run structure
///
/// Each iteration of the orchestrator loop:
/// 1. checks the termination flag
/// 2. compacts the scan domain when the rebuild policy says so
/// 3. launches one wave of [`concurrency`](KCoreConfig::concurrency) peeling tasks
///    at threshold `k`
/// 4. moves `k` to `k + 1` after a productive wave, or straight to the smallest
///    residual degree after an unproductive one
///
/// The loop ends when every node has a core number.
pub struct KCoreDecomposition<'g, G: Graph> {
    graph: &'g G,
    config: KCoreConfig,
    termination: TerminationFlag,
}

impl KCoreDecomposition<'static, CsrGraph> {
    /// The memory estimation of a run with `config`, independent of any graph.
    pub fn memory_estimation(config: &KCoreConfig) -> MemoryEstimation {
        estimation(config)
    }
}

impl<'g, G: Graph> KCoreDecomposition<'g, G> {
    /// Prepares a decomposition of `graph`. Nothing is allocated until [`compute`](Self::compute).
    pub fn new(graph: &'g G, config: KCoreConfig) -> Self {
        Self {
            graph,
            config,
            termination: TerminationFlag::new(),
        }
    }

    /// Uses `termination` to cancel the run from another thread.
    #[must_use]
    pub fn with_termination_flag(mut self, termination: TerminationFlag) -> Self {
        self.termination = termination;
        self
    }

    /// The run's configuration.
    pub fn config(&self) -> &KCoreConfig {
        &self.config
    }

    /// The memory estimate for this graph and configuration.
    pub fn estimate_memory(&self) -> MemoryTree {
        estimation(&self.config).estimate(
            GraphDimensions::new(self.graph.node_count(), self.graph.relationship_count()),
            self.config.concurrency,
        )
    }

    /// Computes the core number of every node.
    ///
    /// # Errors
    ///
    /// - configuration errors, before anything is allocated
    /// - [`KCoreError::CapacityExceeded`] for graphs beyond the paged-array limit
    /// - [`KCoreError::InsufficientMemory`] when the estimate exceeds
    ///   [`max_memory_bytes`](KCoreConfig::max_memory_bytes)
    /// - [`KCoreError::OutOfMemory`] when a page cannot be reserved
    /// - [`KCoreError::Aborted`] when the termination flag was raised
    #[tracing::instrument(
        level = "info",
        name = "kcore",
        skip_all,
        fields(node_count = self.graph.node_count(), concurrency = self.config.concurrency)
    )]
    pub fn compute(&self) -> Result<KCoreResult, KCoreError> {
        self.config.validate()?;
        let node_count = self.graph.node_count();
        check_capacity(node_count)?;

        if let Some(available) = self.config.max_memory_bytes {
            let required = self.estimate_memory().range().max();
            if required > available {
                return Err(KCoreError::InsufficientMemory {
                    required,
                    available,
                });
            }
        }

        self.termination.assert_running()?;
        if node_count == 0 {
            return Ok(KCoreResult::empty());
        }

        tracing::info!(
            node_count,
            concurrency = self.config.concurrency,
            batch_size = self.config.batch_size,
            "starting k-core decomposition"
        );
        let started = Instant::now();
        let pool = WorkerPool::new(self.config.concurrency)?;

        match GhostToken::new(|token| self.run(&token, &pool)) {
            Ok(result) => {
                let stats = result.stats();
                tracing::info!(
                    degeneracy = ?result.degeneracy(),
                    waves = stats.waves,
                    rebuilds = stats.rebuilds,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "k-core decomposition finished"
                );
                Ok(result)
            }
            Err(KCoreError::Aborted) => {
                tracing::warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "k-core decomposition aborted"
                );
                Err(KCoreError::Aborted)
            }
            Err(e) => Err(e),
        }
    }

    fn run<'brand>(
        &self,
        token: &GhostToken<'brand>,
        pool: &WorkerPool,
    ) -> Result<KCoreResult, KCoreError> {
        let node_count = self.graph.node_count();
        let degrees = DegreeTracker::initialize(token, self.graph, pool)?;
        let cores: HugeAtomicArray<'brand, u32> = HugeAtomicArray::new(node_count, UNASSIGNED)?;
        let coordinator = WorkCoordinator::new(token, node_count);
        let mut domain = ScanDomain::Full(node_count);

        let batch_size = self.config.batch_size as u64;
        let mut tasks: Vec<DecompositionTask<'_, 'brand, G>> = (0..pool.concurrency())
            .map(|_| {
                DecompositionTask::new(
                    self.graph,
                    &degrees,
                    &cores,
                    &coordinator,
                    &self.termination,
                    batch_size,
                )
            })
            .collect();

        let mut stats = KCoreStats::default();
        let mut degeneracy = None;
        let mut k = 0u32;

        loop {
            let remaining = coordinator.remaining();
            if remaining == 0 {
                break;
            }
            self.termination.assert_running()?;

            if self.rebuild_due(remaining, domain.len(), node_count, stats.rebuilds) {
                let previous_len = domain.len();
                domain = compact_scan_domain(pool, &domain, &cores, remaining)?;
                stats.rebuilds += 1;
                tracing::info!(previous_len, new_len = domain.len(), "compacted scan domain");
                self.termination.assert_running()?;
            }

            coordinator.start_wave(k);
            pool.wave(&mut tasks, |task| task.run_wave(&domain));
            self.termination.assert_running()?;

            let left = coordinator.remaining();
            let finalized = remaining - left;
            stats.waves += 1;
            stats.final_scan_len = domain.len();
            tracing::debug!(k, finalized, remaining = left, scan_len = domain.len(), "wave done");

            if finalized > 0 {
                stats.productive_waves += 1;
                degeneracy = Some(k);
                k += 1;
            } else {
                // Nothing changed during the wave, so the observed minimum is exact.
                k = match coordinator.smallest_pending_degree() {
                    Some(degree) => degree,
                    None => unreachable!("{left} unassigned nodes outside the scan domain"),
                };
            }
        }

        debug_assert_eq!(
            tasks.iter().map(|task| task.finalized()).sum::<u64>(),
            node_count
        );
        tracing::debug!(
            stack_bytes = tasks.iter().map(|task| task.stack_bytes()).sum::<u64>(),
            "examination stacks released"
        );
        drop(tasks);

        Ok(KCoreResult::new(cores.into_frozen(), degeneracy, stats))
    }

    fn rebuild_due(
        &self,
        remaining: u64,
        domain_len: u64,
        node_count: u64,
        rebuilds: u64,
    ) -> bool {
        let c = self.config.rebuild_constant;
        match self.config.rebuild_policy {
            RebuildPolicy::Once => rebuilds == 0 && (remaining as f64) < c * node_count as f64,
            RebuildPolicy::Repeated => (remaining as f64) < c * domain_len as f64,
            RebuildPolicy::Never => false,
        }
    }
}

impl<G: Graph> core::fmt::Debug for KCoreDecomposition<'_, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KCoreDecomposition")
            .field("node_count", &self.graph.node_count())
            .field("config", &self.config)
            .field("terminated", &!self.termination.running())
            .finish()
    }
}

fn estimation(config: &KCoreConfig) -> MemoryEstimation {
    let domain_copies = match config.rebuild_policy {
        RebuildPolicy::Once => 1,
        RebuildPolicy::Repeated => 2,
        RebuildPolicy::Never => 0,
    };
    let for_domain = config.clone();
    let for_queue = config.clone();

    MemoryEstimation::builder("k-core decomposition")
        .per_node("degree tracker", DegreeTracker::memory_estimation)
        .per_node("core values", HugeAtomicArray::<u32>::memory_estimation)
        .range_per_node("scan domain", move |n| {
            let compacted = rebuild::memory_estimation(for_domain.rebuild_capacity(n));
            MemoryRange::between(0, compacted * domain_copies)
        })
        .range_per_thread("examination stack", |dims| {
            MemoryRange::between(
                PagedStack::<u64>::min_memory_estimation(dims.node_count),
                PagedStack::<u64>::memory_estimation(dims.node_count),
            )
        })
        .range_per_thread("rebuild queue", move |dims| {
            if domain_copies == 0 {
                return MemoryRange::EMPTY;
            }
            let ids = for_queue.rebuild_capacity(dims.node_count);
            MemoryRange::between(0, ids * core::mem::size_of::<u64>() as u64)
        })
        .fixed(
            "coordinator",
            core::mem::size_of::<WorkCoordinator<'static>>() as u64,
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decomposition(graph: &CsrGraph, policy: RebuildPolicy) -> KCoreDecomposition<'_, CsrGraph> {
        KCoreDecomposition::new(
            graph,
            KCoreConfig::default()
                .with_concurrency(1)
                .with_rebuild_policy(policy)
                .with_rebuild_constant(0.5),
        )
    }

    #[test]
    fn once_fires_a_single_time() {
        let graph = CsrGraph::from_edges(10, &[]).unwrap();
        let run = decomposition(&graph, RebuildPolicy::Once);
        assert!(!run.rebuild_due(6, 10, 10, 0));
        assert!(run.rebuild_due(4, 10, 10, 0));
        assert!(!run.rebuild_due(1, 4, 10, 1));
    }

    #[test]
    fn repeated_tracks_the_current_domain() {
        let graph = CsrGraph::from_edges(10, &[]).unwrap();
        let run = decomposition(&graph, RebuildPolicy::Repeated);
        assert!(run.rebuild_due(4, 10, 10, 0));
        assert!(!run.rebuild_due(3, 4, 10, 1));
        assert!(run.rebuild_due(1, 4, 10, 1));
        assert!(!decomposition(&graph, RebuildPolicy::Never).rebuild_due(0, 10, 10, 0));
    }

    #[test]
    fn unproductive_waves_jump_to_the_smallest_degree() {
        // K4: the only level is 3, reached after one empty wave at 0.
        let graph =
            CsrGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]).unwrap();
        let result = decomposition(&graph, RebuildPolicy::Never).compute().unwrap();
        assert_eq!(result.degeneracy(), Some(3));
        assert_eq!(result.stats().waves, 2);
        assert_eq!(result.stats().productive_waves, 1);
    }
}
