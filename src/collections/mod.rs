//! Node-indexed storage.
//!
//! Everything indexed by node id lives in paged arrays: fixed-size pages plus an
//! index → (page, offset) mapping. No single allocation has to hold a whole
//! billion-node dataset, and the footprint of every array can be estimated from
//! `(capacity, element width)` before anything is allocated.

pub mod paged;

pub use paged::{HugeArray, HugeAtomicArray, PagedStack, MAX_CAPACITY, PAGE_SIZE};
