use super::{estimate_bytes, index_in_page, page_count, page_index, page_len, PAGE_HANDLE_BYTES};

/// A bounded LIFO stack over fixed-size pages.
///
/// - capacity is fixed at construction and the page table is reserved up front
/// - pages are allocated on first touch and kept after `pop`/`clear`, so a stack
///   reused across waves stops allocating once it has reached its high-water mark
/// - elements never move once written
///
/// Pushing past capacity panics: callers size the stack to a proven bound.
pub struct PagedStack<T> {
    pages: Vec<Box<[T]>>,
    len: u64,
    capacity: u64,
}

impl<T: Copy + Default> PagedStack<T> {
    /// Creates an empty stack that holds at most `capacity` elements.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            pages: Vec::with_capacity(page_count(capacity)),
            len: 0,
            capacity,
        }
    }

    /// Number of elements on the stack.
    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the stack is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of elements.
    #[inline(always)]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Pushes `value`.
    ///
    /// # Panics
    ///
    /// Panics if the stack is full.
    #[inline]
    pub fn push(&mut self, value: T) {
        assert!(
            self.len < self.capacity,
            "stack overflow: capacity {}",
            self.capacity
        );
        let page = page_index(self.len);
        if page == self.pages.len() {
            let len = page_len(self.capacity, page);
            self.pages.push(vec![T::default(); len].into_boxed_slice());
        }
        self.pages[page][index_in_page(self.len)] = value;
        self.len += 1;
    }

    /// Pops the most recently pushed element.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.pages[page_index(self.len)][index_in_page(self.len)])
    }

    /// Drops all elements, keeping allocated pages.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Bytes currently held by allocated pages.
    pub fn allocated_bytes(&self) -> u64 {
        let slots: u64 = self.pages.iter().map(|page| page.len() as u64).sum();
        slots * core::mem::size_of::<T>() as u64
    }

    /// Estimated bytes for an empty stack of `capacity` elements: the reserved
    /// page table only.
    pub fn min_memory_estimation(capacity: u64) -> u64 {
        estimate_bytes(0, core::mem::size_of::<T>())
            + page_count(capacity) as u64 * PAGE_HANDLE_BYTES
    }

    /// Estimated bytes for a completely filled stack of `capacity` elements.
    pub fn memory_estimation(capacity: u64) -> u64 {
        estimate_bytes(capacity, core::mem::size_of::<T>())
    }
}

impl<T> core::fmt::Debug for PagedStack<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PagedStack")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("pages", &self.pages.len())
            .finish()
    }
}
