use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// An integer type that has a native atomic counterpart.
///
/// Paged atomic arrays store `Self::Atomic` cells and expose values as `Self`.
pub trait AtomicElement: Copy + Eq + Send + Sync + 'static {
    /// The backing atomic cell.
    type Atomic: Send + Sync;

    /// Width of one cell in bytes, used for memory estimation.
    const WIDTH: usize;

    /// Creates a cell holding `value`.
    fn new_cell(value: Self) -> Self::Atomic;

    /// Loads the cell.
    fn load(cell: &Self::Atomic, order: Ordering) -> Self;

    /// Stores into the cell.
    fn store(cell: &Self::Atomic, value: Self, order: Ordering);

    /// Stores `new` if the cell holds `current`.
    fn compare_exchange(
        cell: &Self::Atomic,
        current: Self,
        new: Self,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self, Self>;

    /// Adds `delta` (wrapping), returning the previous value.
    fn fetch_add(cell: &Self::Atomic, delta: Self, order: Ordering) -> Self;

    /// Subtracts `delta` (wrapping), returning the previous value.
    fn fetch_sub(cell: &Self::Atomic, delta: Self, order: Ordering) -> Self;

    /// Consumes the cell.
    fn into_value(cell: Self::Atomic) -> Self;
}

macro_rules! atomic_element {
    ($value:ty, $atomic:ty) => {
        impl AtomicElement for $value {
            type Atomic = $atomic;

            const WIDTH: usize = core::mem::size_of::<$value>();

            #[inline(always)]
            fn new_cell(value: Self) -> Self::Atomic {
                <$atomic>::new(value)
            }

            #[inline(always)]
            fn load(cell: &Self::Atomic, order: Ordering) -> Self {
                cell.load(order)
            }

            #[inline(always)]
            fn store(cell: &Self::Atomic, value: Self, order: Ordering) {
                cell.store(value, order);
            }

            #[inline(always)]
            fn compare_exchange(
                cell: &Self::Atomic,
                current: Self,
                new: Self,
                success: Ordering,
                failure: Ordering,
            ) -> Result<Self, Self> {
                cell.compare_exchange(current, new, success, failure)
            }

            #[inline(always)]
            fn fetch_add(cell: &Self::Atomic, delta: Self, order: Ordering) -> Self {
                cell.fetch_add(delta, order)
            }

            #[inline(always)]
            fn fetch_sub(cell: &Self::Atomic, delta: Self, order: Ordering) -> Self {
                cell.fetch_sub(delta, order)
            }

            #[inline(always)]
            fn into_value(cell: Self::Atomic) -> Self {
                cell.into_inner()
            }
        }
    };
}

atomic_element!(u32, AtomicU32);
atomic_element!(u64, AtomicU64);
