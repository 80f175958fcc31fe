use halo_kcore::collections::{HugeArray, HugeAtomicArray, PagedStack, MAX_CAPACITY, PAGE_SIZE};
use halo_kcore::{GhostToken, KCoreError, WorkerPool};

const PAGE: u64 = PAGE_SIZE as u64;

#[test]
fn huge_array_spans_pages() {
    let len = 2 * PAGE + 3;
    let mut array = HugeArray::<u64>::from_fn(len, |i| i * 2).unwrap();
    assert_eq!(array.len(), len);
    assert_eq!(array.get(PAGE - 1), 2 * (PAGE - 1));
    assert_eq!(array.get(PAGE), 2 * PAGE);
    assert_eq!(array.get(len - 1), 2 * (len - 1));

    array.set(PAGE, 7);
    assert_eq!(array.get(PAGE), 7);

    let mut crossed = Vec::new();
    array.for_each_in_range(PAGE - 2..PAGE + 2, |v| crossed.push(v));
    assert_eq!(crossed, vec![2 * (PAGE - 2), 2 * (PAGE - 1), 7, 2 * (PAGE + 1)]);

    assert_eq!(array.iter().count() as u64, len);
    assert_eq!(array.to_vec().len() as u64, len);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn huge_array_rejects_out_of_range_reads() {
    let array = HugeArray::<u32>::new(10).unwrap();
    let _ = array.get(10);
}

#[test]
fn capacity_beyond_limit_fails_before_allocating() {
    let err = HugeArray::<u8>::new(MAX_CAPACITY + 1).unwrap_err();
    assert_eq!(
        err,
        KCoreError::CapacityExceeded {
            requested: MAX_CAPACITY + 1,
            max: MAX_CAPACITY,
        }
    );
}

#[test]
fn atomic_array_fills_in_parallel_and_freezes() {
    let pool = WorkerPool::new(3).unwrap();
    let len = 3 * PAGE + 11;

    GhostToken::new(|_token| {
        let array: HugeAtomicArray<'_, u32> = HugeAtomicArray::new(len, 0).unwrap();
        pool.install(|| array.par_fill_with_init(|| 5u32, |offset, i| (i as u32) + *offset));

        assert_eq!(array.get(0), 5);
        assert_eq!(array.get(len - 1), (len - 1) as u32 + 5);

        assert_eq!(array.get_and_add(1, 10), 6);
        assert_eq!(array.get_and_sub(1, 1), 16);
        assert!(array.compare_and_set(2, 7, 100));
        assert!(!array.compare_and_set(2, 7, 200));

        let frozen = array.into_frozen();
        assert_eq!(frozen.len(), len);
        assert_eq!(frozen.get(1), 15);
        assert_eq!(frozen.get(2), 100);
        assert_eq!(frozen.get(PAGE + 1), PAGE as u32 + 6);
    });
}

#[test]
fn stack_keeps_pages_across_clears() {
    let mut stack = PagedStack::<u64>::with_capacity(PAGE + 10);
    assert!(stack.is_empty());
    for v in 0..PAGE + 10 {
        stack.push(v);
    }
    let high_water = stack.allocated_bytes();
    assert_eq!(high_water, (PAGE + 10) * 8);

    assert_eq!(stack.pop(), Some(PAGE + 9));
    stack.clear();
    assert!(stack.is_empty());
    stack.push(42);
    assert_eq!(stack.allocated_bytes(), high_water);
    assert_eq!(stack.pop(), Some(42));
    assert_eq!(stack.pop(), None);
}

#[test]
#[should_panic(expected = "stack overflow")]
fn stack_overflow_panics() {
    let mut stack = PagedStack::<u32>::with_capacity(2);
    stack.push(1);
    stack.push(2);
    stack.push(3);
}

#[test]
fn estimates_scale_with_width() {
    let narrow = HugeArray::<u32>::memory_estimation(10 * PAGE);
    let wide = HugeArray::<u64>::memory_estimation(10 * PAGE);
    assert_eq!(wide - narrow, 10 * PAGE * 4);
    assert_eq!(
        HugeAtomicArray::<u64>::memory_estimation(PAGE),
        HugeArray::<u64>::memory_estimation(PAGE)
    );
    assert!(
        PagedStack::<u64>::min_memory_estimation(10 * PAGE)
            < PagedStack::<u64>::memory_estimation(10 * PAGE)
    );
}
