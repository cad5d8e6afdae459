//! Coalescing, splitting, and the fragmentation behavior of the two
//! search policies on scripted layouts.

use tagheap::{Arena, ArenaOptions, MIN_REMAINDER, TAG_OVERHEAD};

fn arena() -> Arena {
    let _ = env_logger::builder().is_test(true).try_init();
    Arena::with_options(ArenaOptions {
        chunk_size: 64 * 1024,
        ..ArenaOptions::default()
    })
}

fn capped_arena(chunk: usize) -> Arena {
    let _ = env_logger::builder().is_test(true).try_init();
    Arena::with_options(ArenaOptions {
        chunk_size: chunk,
        max_size: None,
        growth_disabled: true,
    })
}

/// Offsets, sizes and flags of every block, in address order.
fn layout(a: &Arena) -> Vec<(usize, usize, bool)> {
    a.blocks()
        .map(|b| (b.region.offset(), b.usable, b.allocated))
        .collect()
}

/// Carve three free holes of usable sizes 40, 200 and 64 (in address
/// order), separated and terminated by live guard blocks. Returns the
/// hole offsets.
fn scripted_holes(a: &mut Arena) -> (usize, usize, usize) {
    let h40 = a.allocate_first_fit(40).unwrap();
    let _g = a.allocate_first_fit(16).unwrap();
    let h200 = a.allocate_first_fit(200).unwrap();
    let _g = a.allocate_first_fit(16).unwrap();
    let h64 = a.allocate_first_fit(64).unwrap();
    let _g = a.allocate_first_fit(16).unwrap();
    let offsets = (h40.offset(), h200.offset(), h64.offset());
    a.free(Some(h40));
    a.free(Some(h200));
    a.free(Some(h64));
    offsets
}

// ---------------------------------------------------------------------------
// Freeing two adjacent blocks yields the same merged block either way
// ---------------------------------------------------------------------------

#[test]
fn coalescing_is_order_independent() {
    let run = |first_freed_first: bool| {
        let mut a = arena();
        let _g1 = a.allocate_first_fit(32).unwrap();
        let x = a.allocate_first_fit(64).unwrap();
        let y = a.allocate_first_fit(96).unwrap();
        let _g2 = a.allocate_first_fit(32).unwrap();
        if first_freed_first {
            a.free(Some(x));
            a.free(Some(y));
        } else {
            a.free(Some(y));
            a.free(Some(x));
        }
        a.check_integrity();
        layout(&a)
    };

    let forward = run(true);
    let backward = run(false);
    assert_eq!(
        forward, backward,
        "merge result must not depend on free order"
    );

    // One free block spanning both, tags of the inner pair absorbed.
    let merged = forward
        .iter()
        .find(|(_, _, allocated)| !allocated)
        .expect("merged block");
    assert_eq!(merged.1, 64 + 96 + TAG_OVERHEAD);
}

// ---------------------------------------------------------------------------
// A free in the middle merges with both neighbors in one call
// ---------------------------------------------------------------------------

#[test]
fn free_merges_both_directions() {
    let mut a = arena();
    let _g1 = a.allocate_first_fit(32).unwrap();
    let x = a.allocate_first_fit(40).unwrap();
    let y = a.allocate_first_fit(48).unwrap();
    let z = a.allocate_first_fit(56).unwrap();
    let _g2 = a.allocate_first_fit(32).unwrap();

    a.free(Some(x));
    a.free(Some(z));
    // Freeing the middle block must absorb the holes on both sides.
    a.free(Some(y));

    let frees: Vec<_> = layout(&a)
        .into_iter()
        .filter(|(_, _, allocated)| !allocated)
        .collect();
    assert_eq!(
        frees[0].1,
        40 + 48 + 56 + 2 * TAG_OVERHEAD,
        "three-way span, two inner tag pairs reclaimed"
    );
    a.check_integrity();
}

// ---------------------------------------------------------------------------
// Policy comparison on free holes {40, 200, 64} for a request of 50
// ---------------------------------------------------------------------------

#[test]
fn first_fit_takes_first_hole_that_fits() {
    let mut a = arena();
    let (_o40, o200, _o64) = scripted_holes(&mut a);
    let r = a.allocate_first_fit(50).expect("two holes fit");
    assert_eq!(
        r.offset(),
        o200,
        "first fit must take the 200-byte hole, the first that fits"
    );
    a.check_integrity();
}

#[test]
fn best_fit_takes_tightest_hole() {
    let mut a = arena();
    let (_o40, _o200, o64) = scripted_holes(&mut a);
    let r = a.allocate_best_fit(50).expect("two holes fit");
    assert_eq!(
        r.offset(),
        o64,
        "best fit must take the 64-byte hole, the tightest that fits"
    );
    // 64 - 56 leaves no room for a split, the whole hole is handed out.
    assert_eq!(a.usable_size(r), 64);
    a.check_integrity();
}

// ---------------------------------------------------------------------------
// Split threshold: a viable remainder is carved off, a sliver is not
// ---------------------------------------------------------------------------

#[test]
fn split_carves_minimum_viable_remainder() {
    let mut a = capped_arena(1024);
    let initial = 1024 - TAG_OVERHEAD;
    let r = a.allocate_first_fit(initial - MIN_REMAINDER).unwrap();
    assert_eq!(a.usable_size(r), initial - MIN_REMAINDER);

    let l = layout(&a);
    assert_eq!(l.len(), 2, "block was split");
    assert_eq!(l[1].1, 8, "remainder keeps one aligned payload unit");
    assert!(!l[1].2);
    a.check_integrity();
}

#[test]
fn undersized_remainder_is_not_split() {
    let mut a = capped_arena(1024);
    let initial = 1024 - TAG_OVERHEAD;
    let r = a.allocate_first_fit(initial - MIN_REMAINDER + 8).unwrap();
    assert_eq!(
        a.usable_size(r),
        initial,
        "the caller gets the whole block, slack included"
    );
    assert_eq!(layout(&a).len(), 1, "no split happened");
    assert_eq!(a.check_integrity().free_bytes, 0);
}

// ---------------------------------------------------------------------------
// Freeing everything, in any order, restores one spanning free block
// ---------------------------------------------------------------------------

#[test]
fn freeing_all_restores_spanning_block() {
    let mut a = arena();
    let regions: Vec<_> = (0..8)
        .map(|i| a.allocate_first_fit(32 + 16 * i).unwrap())
        .collect();
    for idx in [3, 0, 7, 1, 5, 2, 6, 4] {
        a.free(Some(regions[idx]));
        a.check_integrity();
    }
    let l = layout(&a);
    assert_eq!(l.len(), 1, "all blocks merged back into one");
    assert!(!l[0].2);
    assert_eq!(l[0].1, a.size() - TAG_OVERHEAD);
}
