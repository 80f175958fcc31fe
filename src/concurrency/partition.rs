//! Static range partitioning.

use core::ops::Range;

/// Splits `0..len` into at most `parts` contiguous, disjoint, non-empty ranges.
///
/// Sizes differ by at most one; earlier ranges take the remainder. An empty
/// input yields no ranges.
///
/// # Panics
///
/// Panics if `parts == 0`.
pub fn range_partition(len: u64, parts: usize) -> Vec<Range<u64>> {
    assert!(parts != 0, "parts must be > 0");
    let parts = (parts as u64).min(len);
    if parts == 0 {
        return Vec::new();
    }
    let base = len / parts;
    let extra = len % parts;

    let mut out = Vec::with_capacity(parts as usize);
    let mut start = 0u64;
    for i in 0..parts {
        let size = base + u64::from(i < extra);
        out.push(start..start + size);
        start += size;
    }
    debug_assert_eq!(start, len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_input_exactly_once() {
        let ranges = range_partition(10, 3);
        assert_eq!(ranges, vec![0..4, 4..7, 7..10]);
    }

    #[test]
    fn never_produces_empty_ranges() {
        assert_eq!(range_partition(2, 8), vec![0..1, 1..2]);
        assert!(range_partition(0, 4).is_empty());
    }
}
