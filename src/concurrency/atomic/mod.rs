//! Lock-free atomic primitives for the decomposition's shared state.
//!
//! - [`AtomicElement`] maps a plain integer to the hardware atomic that backs one
//!   slot of a [`HugeAtomicArray`](crate::collections::HugeAtomicArray).
//! - [`GhostAtomicU64`] is a branded counter used for the coordinator's scan
//!   cursor, countdown and threshold.
//!
//! Neither type takes a lock. Read-modify-write operations still have their
//! inherent hardware cost; the wrappers themselves compile away.

/// Plain-integer to atomic-cell mapping.
pub mod element;
/// Branded `AtomicU64` counter.
pub mod u64;

pub use element::AtomicElement;
pub use u64::GhostAtomicU64;
