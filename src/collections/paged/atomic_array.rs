use core::sync::atomic::Ordering;

use rayon::prelude::*;

use super::{allocate_pages, estimate_bytes, index_in_page, page_index, HugeArray, PAGE_SHIFT};
use crate::{concurrency::atomic::AtomicElement, error::KCoreError, token::InvariantLifetime};

/// A fixed-capacity, paged array of atomic cells.
///
/// Every operation is a single hardware atomic on one cell; nothing here takes a
/// lock. The `'brand` ties the array to the run that allocated it.
///
/// Orderings: loads are `Acquire`, stores `Release`, read-modify-writes `AcqRel`.
/// Those are enough for the write-once / count-down protocols built on top.
pub struct HugeAtomicArray<'brand, T: AtomicElement> {
    pages: Vec<Box<[T::Atomic]>>,
    capacity: u64,
    _brand: InvariantLifetime<'brand>,
}

impl<'brand, T: AtomicElement> HugeAtomicArray<'brand, T> {
    /// Allocates `capacity` cells, all holding `initial`.
    pub fn new(capacity: u64, initial: T) -> Result<Self, KCoreError> {
        let pages = allocate_pages(capacity, T::WIDTH, |_| T::new_cell(initial))?;
        Ok(Self {
            pages,
            capacity,
            _brand: InvariantLifetime::new(),
        })
    }

    /// Number of cells.
    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.capacity
    }

    /// Returns `true` if the array has no cells.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    /// Loads cell `index`.
    #[inline]
    pub fn get(&self, index: u64) -> T {
        T::load(self.cell(index), Ordering::Acquire)
    }

    /// Stores into cell `index`.
    #[inline]
    pub fn set(&self, index: u64, value: T) {
        T::store(self.cell(index), value, Ordering::Release);
    }

    /// Replaces `expected` with `new` in cell `index`.
    ///
    /// Returns `true` if this call performed the write.
    #[inline]
    pub fn compare_and_set(&self, index: u64, expected: T, new: T) -> bool {
        T::compare_exchange(
            self.cell(index),
            expected,
            new,
            Ordering::AcqRel,
            Ordering::Acquire,
        )
        .is_ok()
    }

    /// Adds `delta` to cell `index`, returning the previous value.
    #[inline]
    pub fn get_and_add(&self, index: u64, delta: T) -> T {
        T::fetch_add(self.cell(index), delta, Ordering::AcqRel)
    }

    /// Subtracts `delta` from cell `index`, returning the previous value.
    #[inline]
    pub fn get_and_sub(&self, index: u64, delta: T) -> T {
        T::fetch_sub(self.cell(index), delta, Ordering::AcqRel)
    }

    /// Overwrites every cell with `f(&mut state, index)` in parallel.
    ///
    /// Pages are the unit of work. `init` builds one `state` per rayon job, which
    /// is where per-thread handles (such as a graph's concurrent copy) live.
    /// Call it inside [`WorkerPool::install`](crate::concurrency::WorkerPool::install)
    /// to bound the parallelism.
    pub fn par_fill_with_init<S, INIT, F>(&self, init: INIT, f: F)
    where
        INIT: Fn() -> S + Sync + Send,
        F: Fn(&mut S, u64) -> T + Sync + Send,
    {
        self.pages
            .par_iter()
            .enumerate()
            .for_each_init(init, |state, (page, cells)| {
                let base = (page as u64) << PAGE_SHIFT;
                for (offset, cell) in cells.iter().enumerate() {
                    T::store(cell, f(state, base + offset as u64), Ordering::Relaxed);
                }
            });
    }

    /// Consumes the array into a plain [`HugeArray`].
    ///
    /// Each page is converted in place; element storage is reused rather than copied.
    pub fn into_frozen(self) -> HugeArray<T> {
        let pages = self
            .pages
            .into_iter()
            .map(|page| {
                page.into_vec()
                    .into_iter()
                    .map(T::into_value)
                    .collect::<Vec<T>>()
                    .into_boxed_slice()
            })
            .collect();
        HugeArray::from_pages(pages, self.capacity)
    }

    /// Estimated bytes for an array of `capacity` cells.
    pub fn memory_estimation(capacity: u64) -> u64 {
        estimate_bytes(capacity, T::WIDTH)
    }

    #[inline(always)]
    fn cell(&self, index: u64) -> &T::Atomic {
        assert!(
            index < self.capacity,
            "index {index} out of bounds for capacity {}",
            self.capacity
        );
        &self.pages[page_index(index)][index_in_page(index)]
    }
}

impl<T: AtomicElement + core::fmt::Debug> core::fmt::Debug for HugeAtomicArray<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HugeAtomicArray")
            .field("capacity", &self.capacity)
            .field("pages", &self.pages.len())
            .finish()
    }
}
