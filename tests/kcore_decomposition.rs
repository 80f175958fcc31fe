use std::sync::atomic::{AtomicU64, Ordering};

use halo_kcore::{
    k_core_decomposition, sequential_core_values, CsrGraph, Graph, KCoreConfig,
    KCoreDecomposition, KCoreError, NodeId, RebuildPolicy, TerminationFlag, UNASSIGNED,
};

fn core_values(graph: &CsrGraph, config: KCoreConfig) -> (Vec<u32>, Option<u32>) {
    let result = KCoreDecomposition::new(graph, config).compute().unwrap();
    (result.core_values().to_vec(), result.degeneracy())
}

fn complete(n: u64, offset: u64) -> Vec<(u64, u64)> {
    let mut edges = Vec::new();
    for u in 0..n {
        for v in u + 1..n {
            edges.push((offset + u, offset + v));
        }
    }
    edges
}

/// Deterministic pseudo-random edges (64-bit LCG).
fn random_edges(n: u64, m: usize, seed: u64) -> Vec<(u64, u64)> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        state >> 33
    };
    (0..m).map(|_| (next() % n, next() % n)).collect()
}

#[test]
fn empty_graph_has_no_degeneracy() {
    let graph = CsrGraph::from_edges(0, &[]).unwrap();
    let result = k_core_decomposition(&graph, 4).unwrap();
    assert_eq!(result.degeneracy(), None);
    assert!(result.core_values().is_empty());
    assert_eq!(result.stats().waves, 0);
}

#[test]
fn isolated_node_is_in_the_zero_core() {
    let graph = CsrGraph::from_edges(1, &[]).unwrap();
    let (cores, degeneracy) = core_values(&graph, KCoreConfig::default());
    assert_eq!(cores, vec![0]);
    assert_eq!(degeneracy, Some(0));
}

#[test]
fn triangle() {
    let graph = CsrGraph::from_edges(3, &[(0, 1), (1, 2), (2, 0)]).unwrap();
    let (cores, degeneracy) = core_values(&graph, KCoreConfig::default());
    assert_eq!(cores, vec![2, 2, 2]);
    assert_eq!(degeneracy, Some(2));
}

#[test]
fn star_center_is_not_its_degree() {
    let edges: Vec<_> = (1..50).map(|leaf| (0, leaf)).collect();
    let graph = CsrGraph::from_edges(50, &edges).unwrap();
    for concurrency in [1, 2, 8] {
        let (cores, degeneracy) =
            core_values(&graph, KCoreConfig::default().with_concurrency(concurrency));
        assert_eq!(cores, vec![1; 50]);
        assert_eq!(degeneracy, Some(1));
    }
}

#[test]
fn bridged_triangles_stay_in_the_two_core() {
    let edges = [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)];
    let graph = CsrGraph::from_edges(6, &edges).unwrap();
    let (cores, degeneracy) = core_values(&graph, KCoreConfig::default());
    assert_eq!(cores, vec![2; 6]);
    assert_eq!(degeneracy, Some(2));
}

#[test]
fn pendant_path_on_a_clique() {
    // K5 on 0..5, then 4 - 5 - 6 and the isolated node 7.
    let mut edges = complete(5, 0);
    edges.extend([(4, 5), (5, 6)]);
    let graph = CsrGraph::from_edges(8, &edges).unwrap();
    let (cores, degeneracy) = core_values(&graph, KCoreConfig::default().with_batch_size(1));
    assert_eq!(cores, vec![4, 4, 4, 4, 4, 1, 1, 0]);
    assert_eq!(degeneracy, Some(4));
}

#[test]
fn self_loops_and_parallel_edges() {
    let edges = [(0, 0), (0, 1), (0, 1), (1, 2), (2, 2), (2, 2)];
    let graph = CsrGraph::from_edges(3, &edges).unwrap();
    let (cores, _) = core_values(&graph, KCoreConfig::default().with_concurrency(2));
    assert_eq!(cores, sequential_core_values(&graph));
}

#[test]
fn bounds_and_degeneracy_hold_on_a_random_graph() {
    let n = 5_000;
    let graph = CsrGraph::from_edges(n, &random_edges(n, 40_000, 7)).unwrap();
    let expected = sequential_core_values(&graph);

    for concurrency in [1, 2, 8] {
        for policy in [RebuildPolicy::Once, RebuildPolicy::Repeated, RebuildPolicy::Never] {
            let config = KCoreConfig::default()
                .with_concurrency(concurrency)
                .with_rebuild_policy(policy)
                .with_rebuild_constant(0.5);
            let result = KCoreDecomposition::new(&graph, config).compute().unwrap();
            let cores = result.core_values().to_vec();

            assert_eq!(cores, expected, "concurrency={concurrency} policy={policy:?}");
            for (node, &core) in cores.iter().enumerate() {
                assert_ne!(core, UNASSIGNED);
                assert!(core <= graph.degree(node as NodeId));
            }
            assert_eq!(result.degeneracy(), cores.iter().copied().max());
        }
    }
}

#[test]
fn compaction_runs_once_the_star_is_gone() {
    // Star on 0..101, K5 on 101..106.
    let mut edges: Vec<_> = (1..101).map(|leaf| (0, leaf)).collect();
    edges.extend(complete(5, 101));
    let graph = CsrGraph::from_edges(106, &edges).unwrap();

    for policy in [RebuildPolicy::Once, RebuildPolicy::Repeated] {
        let config = KCoreConfig::default().with_concurrency(3).with_rebuild_policy(policy);
        let result = KCoreDecomposition::new(&graph, config).compute().unwrap();
        let stats = result.stats();
        assert_eq!(result.degeneracy(), Some(4));
        assert_eq!(stats.rebuilds, 1, "{policy:?}");
        assert_eq!(stats.final_scan_len, 5);
        assert_eq!(stats.waves, 4);
        assert_eq!(stats.productive_waves, 2);
        assert_eq!(result.nodes_in_core(4), (101..106).collect::<Vec<_>>());
    }

    let config = KCoreConfig::default().with_rebuild_policy(RebuildPolicy::Never);
    let stats = KCoreDecomposition::new(&graph, config).compute().unwrap().stats();
    assert_eq!(stats.rebuilds, 0);
    assert_eq!(stats.final_scan_len, 106);
}

#[test]
fn result_accessors() {
    let mut edges = complete(4, 0);
    edges.push((3, 4));
    let graph = CsrGraph::from_edges(5, &edges).unwrap();
    let result = k_core_decomposition(&graph, 2).unwrap();

    assert_eq!(result.core_value(0), 3);
    assert_eq!(result.core_value(4), 1);
    assert_eq!(result.nodes_in_core(0).len(), 5);
    assert_eq!(result.nodes_in_core(2), vec![0, 1, 2, 3]);
    assert!(result.nodes_in_core(4).is_empty());

    let json = serde_json::to_value(result.stats()).unwrap();
    assert!(json.get("productive_waves").is_some());
    assert_eq!(result.into_core_values().to_vec(), vec![3, 3, 3, 3, 1]);
}

#[test]
fn raised_flag_aborts_before_work() {
    let graph = CsrGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
    let flag = TerminationFlag::new();
    flag.terminate();
    let err = KCoreDecomposition::new(&graph, KCoreConfig::default())
        .with_termination_flag(flag)
        .compute()
        .unwrap_err();
    assert_eq!(err, KCoreError::Aborted);
}

/// Raises the termination flag after a fixed number of neighbour visits.
struct TrippingGraph {
    inner: CsrGraph,
    flag: TerminationFlag,
    budget: AtomicU64,
}

#[derive(Clone, Copy)]
struct TrippingCursor<'g>(&'g TrippingGraph);

impl Graph for TrippingGraph {
    type ConcurrentCopy<'g> = TrippingCursor<'g>
    where
        Self: 'g;

    fn node_count(&self) -> u64 {
        self.inner.node_count()
    }

    fn relationship_count(&self) -> u64 {
        self.inner.relationship_count()
    }

    fn degree(&self, node: NodeId) -> u32 {
        self.inner.degree(node)
    }

    fn for_each_neighbor<F: FnMut(NodeId)>(&self, node: NodeId, visitor: F) {
        if self.budget.fetch_sub(1, Ordering::Relaxed) == 1 {
            self.flag.terminate();
        }
        self.inner.for_each_neighbor(node, visitor);
    }

    fn concurrent_copy(&self) -> Self::ConcurrentCopy<'_> {
        TrippingCursor(self)
    }
}

impl Graph for TrippingCursor<'_> {
    type ConcurrentCopy<'h> = TrippingCursor<'h>
    where
        Self: 'h;

    fn node_count(&self) -> u64 {
        self.0.node_count()
    }

    fn relationship_count(&self) -> u64 {
        self.0.relationship_count()
    }

    fn degree(&self, node: NodeId) -> u32 {
        self.0.degree(node)
    }

    fn for_each_neighbor<F: FnMut(NodeId)>(&self, node: NodeId, visitor: F) {
        self.0.for_each_neighbor(node, visitor);
    }

    fn concurrent_copy(&self) -> Self::ConcurrentCopy<'_> {
        TrippingCursor(self.0)
    }
}

#[test]
fn flag_raised_mid_run_aborts() {
    let n = 2_000;
    let path: Vec<_> = (0..n - 1).map(|v| (v, v + 1)).collect();
    let flag = TerminationFlag::new();
    let graph = TrippingGraph {
        inner: CsrGraph::from_edges(n, &path).unwrap(),
        flag: flag.clone(),
        budget: AtomicU64::new(10),
    };

    let err = KCoreDecomposition::new(&graph, KCoreConfig::default().with_concurrency(2))
        .with_termination_flag(flag.clone())
        .compute()
        .unwrap_err();
    assert_eq!(err, KCoreError::Aborted);
    assert!(!flag.running());
}

/// A graph that only reports its size.
struct Unbacked(u64);

impl Graph for Unbacked {
    type ConcurrentCopy<'g> = &'g Unbacked;

    fn node_count(&self) -> u64 {
        self.0
    }

    fn relationship_count(&self) -> u64 {
        0
    }

    fn degree(&self, _node: NodeId) -> u32 {
        0
    }

    fn for_each_neighbor<F: FnMut(NodeId)>(&self, _node: NodeId, _visitor: F) {}

    fn concurrent_copy(&self) -> Self::ConcurrentCopy<'_> {
        self
    }
}

impl Graph for &Unbacked {
    type ConcurrentCopy<'g> = &'g Unbacked
    where
        Self: 'g;

    fn node_count(&self) -> u64 {
        self.0
    }

    fn relationship_count(&self) -> u64 {
        0
    }

    fn degree(&self, _node: NodeId) -> u32 {
        0
    }

    fn for_each_neighbor<F: FnMut(NodeId)>(&self, _node: NodeId, _visitor: F) {}

    fn concurrent_copy(&self) -> Self::ConcurrentCopy<'_> {
        *self
    }
}

#[test]
fn oversized_graph_is_rejected_before_allocation() {
    let graph = Unbacked(halo_kcore::collections::MAX_CAPACITY + 1);
    let err = k_core_decomposition(&graph, 1).unwrap_err();
    assert!(matches!(err, KCoreError::CapacityExceeded { .. }));
}

#[test]
fn memory_guard_rejects_large_runs() {
    let graph = Unbacked(1_000_000);
    let config = KCoreConfig::default().with_max_memory_bytes(1 << 20);
    let err = KCoreDecomposition::new(&graph, config).compute().unwrap_err();
    match err {
        KCoreError::InsufficientMemory {
            required,
            available,
        } => {
            assert_eq!(available, 1 << 20);
            assert!(required > available);
        }
        other => panic!("unexpected error: {other}"),
    }

    // The same guard lets a small run through.
    let small = Unbacked(10);
    let config = KCoreConfig::default().with_max_memory_bytes(1 << 20);
    let result = KCoreDecomposition::new(&small, config).compute().unwrap();
    assert_eq!(result.core_values().to_vec(), vec![0; 10]);
}

#[test]
fn invalid_configuration_is_rejected() {
    let graph = CsrGraph::from_edges(2, &[(0, 1)]).unwrap();
    let run = |config: KCoreConfig| KCoreDecomposition::new(&graph, config).compute().unwrap_err();

    assert_eq!(
        run(KCoreConfig::default().with_concurrency(0)),
        KCoreError::InvalidConcurrency
    );
    assert_eq!(
        run(KCoreConfig::default().with_batch_size(0)),
        KCoreError::InvalidBatchSize
    );
    for c in [0.0, -0.5, 1.5, f64::NAN] {
        assert!(matches!(
            run(KCoreConfig::default().with_rebuild_constant(c)),
            KCoreError::InvalidRebuildConstant(_)
        ));
    }
    // The upper bound is inclusive.
    assert!(KCoreConfig::default().with_rebuild_constant(1.0).validate().is_ok());
}

#[test]
fn configuration_from_json() {
    let config = KCoreConfig::from_json(
        r#"{ "concurrency": 2, "batch_size": 16, "rebuild_constant": 0.25,
             "rebuild_policy": "never", "max_memory_bytes": 4096 }"#,
    )
    .unwrap();
    assert_eq!(
        config,
        KCoreConfig::default()
            .with_concurrency(2)
            .with_batch_size(16)
            .with_rebuild_constant(0.25)
            .with_rebuild_policy(RebuildPolicy::Never)
            .with_max_memory_bytes(4096)
    );

    assert_eq!(KCoreConfig::from_json("{}").unwrap(), KCoreConfig::default());
    assert!(matches!(
        KCoreConfig::from_json(r#"{ "threads": 4 }"#),
        Err(KCoreError::InvalidConfig(_))
    ));
    assert_eq!(
        KCoreConfig::from_json(r#"{ "concurrency": 0 }"#),
        Err(KCoreError::InvalidConcurrency)
    );

    let round_trip = serde_json::to_string(&config).unwrap();
    assert_eq!(KCoreConfig::from_json(&round_trip).unwrap(), config);
}
