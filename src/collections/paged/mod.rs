//! Page geometry shared by all paged containers.
//!
//! | Quantity | Value |
//! |---|---|
//! | page size | `2^14` elements |
//! | page of index `i` | `i >> 14` |
//! | offset of index `i` | `i & (2^14 - 1)` |
//! | last page | sized to the remainder |
//! | max capacity | `2^14 * 2^32` elements |

mod atomic_array;
mod huge_array;
mod stack;

pub use atomic_array::HugeAtomicArray;
pub use huge_array::HugeArray;
pub use stack::PagedStack;

use crate::error::KCoreError;

/// Bits of an index that select the offset within a page.
pub const PAGE_SHIFT: u32 = 14;
/// Elements per full page.
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;
const PAGE_MASK: u64 = (PAGE_SIZE as u64) - 1;
/// Largest element count a paged container accepts.
pub const MAX_CAPACITY: u64 = (PAGE_SIZE as u64) << 32;

/// Bookkeeping bytes for one boxed page (fat pointer in the page table).
const PAGE_HANDLE_BYTES: u64 = 2 * core::mem::size_of::<usize>() as u64;
/// Bookkeeping bytes for the container itself.
const CONTAINER_BYTES: u64 = 4 * core::mem::size_of::<usize>() as u64;

const _: () = assert!(PAGE_SIZE.is_power_of_two());

#[inline(always)]
pub(crate) const fn page_index(index: u64) -> usize {
    (index >> PAGE_SHIFT) as usize
}

#[inline(always)]
pub(crate) const fn index_in_page(index: u64) -> usize {
    (index & PAGE_MASK) as usize
}

#[inline]
pub(crate) const fn page_count(capacity: u64) -> usize {
    capacity.div_ceil(PAGE_SIZE as u64) as usize
}

/// Length of page `page` in a container of `capacity` elements.
#[inline]
pub(crate) fn page_len(capacity: u64, page: usize) -> usize {
    let start = (page as u64) << PAGE_SHIFT;
    debug_assert!(start < capacity);
    (capacity - start).min(PAGE_SIZE as u64) as usize
}

/// Rejects capacities beyond [`MAX_CAPACITY`].
pub(crate) fn check_capacity(capacity: u64) -> Result<(), KCoreError> {
    if capacity > MAX_CAPACITY {
        return Err(KCoreError::CapacityExceeded {
            requested: capacity,
            max: MAX_CAPACITY,
        });
    }
    Ok(())
}

/// Estimated bytes for `capacity` elements of `width` bytes each.
///
/// Depends only on its arguments, so it can be evaluated before allocating.
pub fn estimate_bytes(capacity: u64, width: usize) -> u64 {
    let pages = page_count(capacity) as u64;
    CONTAINER_BYTES + pages * PAGE_HANDLE_BYTES + capacity.saturating_mul(width as u64)
}

/// Allocates the page table and every page, filling slots with `fill(index)`.
///
/// Reservations go through `try_reserve_exact`; a failure is reported as
/// [`KCoreError::OutOfMemory`] and everything allocated so far is dropped.
pub(crate) fn allocate_pages<T>(
    capacity: u64,
    width: usize,
    mut fill: impl FnMut(u64) -> T,
) -> Result<Vec<Box<[T]>>, KCoreError> {
    check_capacity(capacity)?;
    let count = page_count(capacity);

    let mut pages: Vec<Box<[T]>> = Vec::new();
    pages.try_reserve_exact(count).map_err(|_| KCoreError::OutOfMemory {
        bytes: count as u64 * PAGE_HANDLE_BYTES,
    })?;

    for page in 0..count {
        let len = page_len(capacity, page);
        let mut slots: Vec<T> = Vec::new();
        slots.try_reserve_exact(len).map_err(|_| KCoreError::OutOfMemory {
            bytes: (len * width) as u64,
        })?;
        let base = (page as u64) << PAGE_SHIFT;
        slots.extend((0..len as u64).map(|i| fill(base + i)));
        pages.push(slots.into_boxed_slice());
    }
    Ok(pages)
}
