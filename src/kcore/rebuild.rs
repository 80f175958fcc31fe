use core::{ops::Range, sync::atomic::Ordering};

use crate::{
    collections::HugeAtomicArray,
    concurrency::{atomic::GhostAtomicU64, range_partition, WorkerPool},
    error::KCoreError,
    graph::NodeId,
};

use super::{coordinator::ScanDomain, UNASSIGNED};

/// Collects the unassigned nodes of one contiguous slice of the old domain.
///
/// Matches are buffered locally and then written with a single reservation on
/// the shared write cursor, so tasks never interleave inside each other's run.
struct RebuildTask<'a, 'brand> {
    offsets: Range<u64>,
    buffer: Vec<NodeId>,
    domain: &'a ScanDomain<'brand>,
    cores: &'a HugeAtomicArray<'brand, u32>,
    target: &'a HugeAtomicArray<'brand, u64>,
    write_cursor: &'a GhostAtomicU64<'brand>,
}

impl RebuildTask<'_, '_> {
    fn run(&mut self) {
        for offset in self.offsets.clone() {
            let node = self.domain.node_at(offset);
            if self.cores.get(node) == UNASSIGNED {
                self.buffer.push(node);
            }
        }
        if self.buffer.is_empty() {
            return;
        }
        let start = self
            .write_cursor
            .fetch_add(self.buffer.len() as u64, Ordering::Relaxed);
        for (i, &node) in self.buffer.iter().enumerate() {
            self.target.set(start + i as u64, node);
        }
    }
}

/// Builds a dense scan domain holding exactly the unassigned nodes of `domain`.
///
/// Must run between waves: with no task mutating `cores`, the unassigned count
/// equals `remaining` and sizes the new array exactly. The order of ids in the
/// result is unspecified.
pub(crate) fn compact_scan_domain<'brand>(
    pool: &WorkerPool,
    domain: &ScanDomain<'brand>,
    cores: &HugeAtomicArray<'brand, u32>,
    remaining: u64,
) -> Result<ScanDomain<'brand>, KCoreError> {
    let target = HugeAtomicArray::new(remaining, 0u64)?;
    let write_cursor = GhostAtomicU64::new(0);

    let partitions = range_partition(domain.len(), pool.concurrency());
    let mut tasks: Vec<RebuildTask<'_, 'brand>> = partitions
        .into_iter()
        .map(|offsets| RebuildTask {
            offsets,
            buffer: Vec::new(),
            domain,
            cores,
            target: &target,
            write_cursor: &write_cursor,
        })
        .collect();
    pool.wave(&mut tasks, |task| task.run());
    drop(tasks);

    debug_assert_eq!(write_cursor.load(Ordering::Relaxed), remaining);
    Ok(ScanDomain::Compacted(target))
}

/// Estimated bytes for one compacted domain of `capacity` ids.
pub(crate) fn memory_estimation(capacity: u64) -> u64 {
    HugeAtomicArray::<u64>::memory_estimation(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::GhostToken;

    fn compacted_ids(domain: &ScanDomain<'_>) -> Vec<u64> {
        let mut ids: Vec<u64> = (0..domain.len()).map(|i| domain.node_at(i)).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn keeps_exactly_the_unassigned_nodes() {
        let pool = WorkerPool::new(3).unwrap();
        GhostToken::new(|_token| {
            let cores = HugeAtomicArray::new(20, UNASSIGNED).unwrap();
            for node in (0..20).filter(|n| n % 3 != 0) {
                cores.set(node, 1);
            }
            let expected: Vec<u64> = (0..20).filter(|n| n % 3 == 0).collect();

            let compacted =
                compact_scan_domain(&pool, &ScanDomain::Full(20), &cores, expected.len() as u64)
                    .unwrap();
            assert_eq!(compacted.len(), expected.len() as u64);
            assert_eq!(compacted_ids(&compacted), expected);

            // Compacting an already compacted domain.
            cores.set(0, 2);
            cores.set(9, 2);
            let again = compact_scan_domain(&pool, &compacted, &cores, 5).unwrap();
            assert_eq!(compacted_ids(&again), vec![3, 6, 12, 15, 18]);
        });
    }

    #[test]
    fn empty_result_when_everything_is_assigned() {
        let pool = WorkerPool::new(2).unwrap();
        GhostToken::new(|_token| {
            let cores = HugeAtomicArray::new(5, 0u32).unwrap();
            let compacted = compact_scan_domain(&pool, &ScanDomain::Full(5), &cores, 0).unwrap();
            assert_eq!(compacted.len(), 0);
        });
    }
}
