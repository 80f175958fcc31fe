//! Sequential reference decomposition.
//!
//! Batagelj and Zaversnik's bin-sort peeling: `O(n + m)` time, one thread.
//! Used to check the parallel engine and as a baseline in benchmarks.

use crate::graph::Graph;

/// Core number of every node of `graph`, computed sequentially.
///
/// Self-loops count towards a node's degree and are never peeled, matching the
/// parallel engine.
///
/// # Panics
///
/// Panics if the graph does not fit in memory as plain `Vec`s.
pub fn sequential_core_values<G: Graph>(graph: &G) -> Vec<u32> {
    let n = usize::try_from(graph.node_count()).expect("node count exceeds addressable memory");
    let mut degree: Vec<usize> = (0..n).map(|v| graph.degree(v as u64) as usize).collect();
    let max_degree = degree.iter().copied().max().unwrap_or(0);

    // bin[d] = first position in `order` holding a node of degree d.
    let mut bin = vec![0usize; max_degree + 1];
    for &d in &degree {
        bin[d] += 1;
    }
    let mut start = 0;
    for slot in bin.iter_mut() {
        let count = *slot;
        *slot = start;
        start += count;
    }

    let mut order = vec![0usize; n];
    let mut position = vec![0usize; n];
    for v in 0..n {
        let d = degree[v];
        position[v] = bin[d];
        order[bin[d]] = v;
        bin[d] += 1;
    }
    for d in (1..=max_degree).rev() {
        bin[d] = bin[d - 1];
    }
    if let Some(first) = bin.first_mut() {
        *first = 0;
    }

    for i in 0..n {
        let v = order[i];
        graph.for_each_neighbor(v as u64, |u| {
            let u = u as usize;
            if degree[u] <= degree[v] {
                return;
            }
            let du = degree[u];
            let pu = position[u];
            let pw = bin[du];
            let w = order[pw];
            if u != w {
                order.swap(pu, pw);
                position[u] = pw;
                position[w] = pu;
            }
            bin[du] += 1;
            degree[u] -= 1;
        });
    }

    degree.into_iter().map(|d| d as u32).collect()
}
