#![no_main]

use libfuzzer_sys::fuzz_target;
use tagheap::{Arena, ArenaOptions};

// Fuzz target that exercises size boundaries.
// Interprets input as a series of little-endian u32 words; each word is
// one allocation request, first-fit or best-fit by its top bit. Every
// region is written to its full usable extent and read back, then
// resized past its block boundary and freed, so the split, alignment
// and in-place-growth arithmetic all see sizes right at the thresholds.

fuzz_target!(|data: &[u8]| {
    let mut arena = Arena::with_options(ArenaOptions {
        chunk_size: 4096,
        max_size: Some(1 << 22),
        growth_disabled: false,
    });

    let mut i = 0;
    while i + 4 <= data.len() {
        let raw = u32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        i += 4;

        // Cap the request so a hostile input cannot balloon the arena.
        let size = (raw as usize) % (64 * 1024);

        let region = if raw >> 31 == 0 {
            arena.allocate_first_fit(size)
        } else {
            arena.allocate_best_fit(size)
        };
        let Some(r) = region else {
            continue; // exhaustion under the size cap is fine
        };

        assert_eq!(r.offset() % 8, 0, "payload at {} is unaligned", r.offset());
        let usable = arena.usable_size(r);
        assert!(usable >= size, "usable {usable} < requested {size}");

        // The full usable extent must be writable and hold its bytes.
        arena.payload_mut(r).fill(0xBB);
        assert!(arena.payload(r).iter().all(|&b| b == 0xBB));

        // Doubling the size forces growth past the block's own capacity.
        match arena.resize(Some(r), size * 2) {
            Some(grown) => {
                assert!(arena.usable_size(grown) >= size * 2);
                assert!(
                    arena.payload(grown)[..usable].iter().all(|&b| b == 0xBB),
                    "resize lost payload bytes for request {size}"
                );
                arena.free(Some(grown));
            }
            None => arena.free(Some(r)),
        }
    }

    let stats = arena.check_integrity();
    assert_eq!(stats.allocated_bytes, 0, "cleanup left live blocks behind");
});
