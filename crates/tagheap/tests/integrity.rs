//! Arena-wide accounting and growth behavior, verified through the
//! consistency walk after every step of mixed operation sequences.

use tagheap::{Arena, ArenaOptions, Region, SearchMode, TAG_OVERHEAD};

fn arena_with_chunk(chunk: usize) -> Arena {
    let _ = env_logger::builder().is_test(true).try_init();
    Arena::with_options(ArenaOptions {
        chunk_size: chunk,
        ..ArenaOptions::default()
    })
}

/// Accounting identity: every byte is either payload or tag overhead.
fn assert_accounted(a: &Arena) {
    let stats = a.check_integrity();
    assert_eq!(
        stats.allocated_bytes + stats.free_bytes + stats.blocks * TAG_OVERHEAD,
        stats.arena_size,
        "walk accounting mismatch: {stats:?}"
    );
}

// ---------------------------------------------------------------------------
// Exact bookkeeping on a known layout
// ---------------------------------------------------------------------------

#[test]
fn stats_match_known_layout() {
    let mut a = arena_with_chunk(1024);
    let r = a.allocate_first_fit(100).unwrap();
    let stats = a.check_integrity();
    assert_eq!(stats.blocks, 2);
    assert_eq!(stats.allocated_bytes, 104, "request rounds up to 104");
    assert_eq!(stats.free_bytes, 1024 - 2 * TAG_OVERHEAD - 104);
    assert_eq!(stats.arena_size, 1024);

    let from_iter: Vec<_> = a.blocks().collect();
    assert_eq!(from_iter.len(), stats.blocks);
    assert_eq!(
        from_iter.iter().map(|b| b.usable).sum::<usize>(),
        stats.allocated_bytes + stats.free_bytes
    );
    a.free(Some(r));
}

// ---------------------------------------------------------------------------
// Growth appends a chunk and merges it with a free tail
// ---------------------------------------------------------------------------

#[test]
fn growth_coalesces_with_free_tail() {
    let mut a = arena_with_chunk(1024);
    let warm = a.allocate_first_fit(16).unwrap();
    a.free(Some(warm));
    assert_eq!(a.size(), 1024);

    // Nothing in the first chunk fits 2000 bytes, so the arena grows;
    // the grown range must merge with the spanning free block, letting
    // the request start at the very front of the arena.
    let big = a.allocate_first_fit(2000).expect("growth enabled");
    assert_eq!(big.offset(), 16, "merged block starts at the arena front");
    assert_eq!(a.size(), 1024 + 2000 + TAG_OVERHEAD);
    assert_accounted(&a);
    a.free(Some(big));
    assert_eq!(
        a.check_integrity().free_bytes,
        a.size() - TAG_OVERHEAD,
        "one spanning free block after the last free"
    );
}

// ---------------------------------------------------------------------------
// Growth denied past the configured size cap
// ---------------------------------------------------------------------------

#[test]
fn growth_respects_size_cap() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut a = Arena::with_options(ArenaOptions {
        chunk_size: 1024,
        max_size: Some(2048),
        growth_disabled: false,
    });
    let r = a.allocate_first_fit(500).expect("fits the first chunk");
    assert!(
        a.allocate_first_fit(4000).is_none(),
        "growing past the cap must fail"
    );
    // A second chunk still fits under the cap exactly.
    let s = a.allocate_first_fit(900).expect("one more chunk allowed");
    assert_eq!(a.size(), 2048, "growth rounds up to a whole chunk");
    assert_accounted(&a);
    a.free(Some(r));
    a.free(Some(s));
}

#[test]
fn giant_request_denied_under_size_cap() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut a = Arena::with_options(ArenaOptions {
        chunk_size: 1024,
        max_size: Some(4096),
        growth_disabled: false,
    });
    let r = a.allocate_first_fit(200).expect("fits the first chunk");
    assert!(
        a.allocate_first_fit(usize::MAX - 64).is_none(),
        "cap bookkeeping must reject the request, not wrap"
    );
    assert_accounted(&a);
    a.free(Some(r));
}

#[test]
fn cap_below_one_chunk_blocks_initialization() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut a = Arena::with_options(ArenaOptions {
        chunk_size: 4096,
        max_size: Some(1024),
        growth_disabled: false,
    });
    assert!(a.allocate_first_fit(1).is_none());
    assert!(!a.is_initialized());
}

// ---------------------------------------------------------------------------
// Accounting holds across a long mixed sequence
// ---------------------------------------------------------------------------

#[test]
fn accounting_survives_mixed_churn() {
    let mut a = arena_with_chunk(4096);
    let mut slots: Vec<Option<Region>> = vec![None; 8];
    // Deterministic size schedule, co-prime strides so slots see
    // alloc/free/resize in varying orders.
    for step in 0..400usize {
        let slot = (step * 5) % slots.len();
        let size = 16 + (step * 37) % 600;
        match step % 4 {
            0 => {
                a.free(slots[slot].take());
                slots[slot] = a.allocate(size, SearchMode::FirstFit);
            }
            1 => {
                a.free(slots[slot].take());
                slots[slot] = a.allocate(size, SearchMode::BestFit);
            }
            2 => {
                slots[slot] = a.resize(slots[slot].take(), size);
            }
            _ => {
                a.free(slots[slot].take());
            }
        }
        assert_accounted(&a);
    }
    for slot in &mut slots {
        a.free(slot.take());
    }
    assert_eq!(a.check_integrity().allocated_bytes, 0);
}
