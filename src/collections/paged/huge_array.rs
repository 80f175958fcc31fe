use core::ops::Range;

use super::{allocate_pages, estimate_bytes, index_in_page, page_index, PAGE_SHIFT};
use crate::error::KCoreError;

/// A fixed-capacity, paged array of plain values.
///
/// Capacity is set at construction; there is no push. Reads and writes take a
/// 64-bit index and panic when it is out of range.
pub struct HugeArray<T> {
    pages: Vec<Box<[T]>>,
    capacity: u64,
}

impl<T: Copy + Default> HugeArray<T> {
    /// Allocates `capacity` default-initialized slots.
    pub fn new(capacity: u64) -> Result<Self, KCoreError> {
        Self::filled(capacity, T::default())
    }

    /// Allocates `capacity` slots, all holding `value`.
    pub fn filled(capacity: u64, value: T) -> Result<Self, KCoreError> {
        let pages = allocate_pages(capacity, core::mem::size_of::<T>(), |_| value)?;
        Ok(Self { pages, capacity })
    }

    /// Allocates `capacity` slots initialized by `f(index)`.
    pub fn from_fn(capacity: u64, f: impl FnMut(u64) -> T) -> Result<Self, KCoreError> {
        let pages = allocate_pages(capacity, core::mem::size_of::<T>(), f)?;
        Ok(Self { pages, capacity })
    }
}

impl<T: Copy> HugeArray<T> {
    pub(crate) fn from_pages(pages: Vec<Box<[T]>>, capacity: u64) -> Self {
        debug_assert_eq!(
            pages.iter().map(|p| p.len() as u64).sum::<u64>(),
            capacity
        );
        Self { pages, capacity }
    }

    /// Number of slots.
    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.capacity
    }

    /// Returns `true` if the array has no slots.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    /// Reads slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn get(&self, index: u64) -> T {
        self.check(index);
        self.pages[page_index(index)][index_in_page(index)]
    }

    /// Writes slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn set(&mut self, index: u64, value: T) {
        self.check(index);
        self.pages[page_index(index)][index_in_page(index)] = value;
    }

    /// Calls `f` for every value in `range`, walking page slices.
    ///
    /// # Panics
    ///
    /// Panics if `range.end > self.len()`.
    pub fn for_each_in_range(&self, range: Range<u64>, mut f: impl FnMut(T)) {
        if range.start >= range.end {
            return;
        }
        assert!(
            range.end <= self.capacity,
            "range end {} out of bounds for capacity {}",
            range.end,
            self.capacity
        );
        let mut cursor = range.start;
        while cursor < range.end {
            let page = page_index(cursor);
            let from = index_in_page(cursor);
            let page_end = ((page as u64) + 1) << PAGE_SHIFT;
            let to = from + (range.end.min(page_end) - cursor) as usize;
            for &value in &self.pages[page][from..to] {
                f(value);
            }
            cursor += (to - from) as u64;
        }
    }

    /// Iterates over all values in index order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.pages.iter().flat_map(|page| page.iter().copied())
    }

    /// Copies the values into a `Vec`.
    ///
    /// # Panics
    ///
    /// Panics if the array does not fit a single allocation on this platform.
    pub fn to_vec(&self) -> Vec<T> {
        let len = usize::try_from(self.capacity).expect("array exceeds addressable memory");
        let mut out = Vec::with_capacity(len);
        for page in &self.pages {
            out.extend_from_slice(page);
        }
        out
    }

    /// Estimated bytes for an array of `capacity` slots.
    pub fn memory_estimation(capacity: u64) -> u64 {
        estimate_bytes(capacity, core::mem::size_of::<T>())
    }

    #[inline(always)]
    fn check(&self, index: u64) {
        assert!(
            index < self.capacity,
            "index {index} out of bounds for capacity {}",
            self.capacity
        );
    }
}

impl<T: Copy + core::fmt::Debug> core::fmt::Debug for HugeArray<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        const PREVIEW: usize = 16;
        let mut list = f.debug_list();
        list.entries(self.iter().take(PREVIEW));
        if self.capacity > PREVIEW as u64 {
            list.entry(&format_args!("… {} more", self.capacity - PREVIEW as u64));
        }
        list.finish()
    }
}
