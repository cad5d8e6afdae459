#![no_main]

use libfuzzer_sys::fuzz_target;
use tagheap::{Arena, ArenaOptions, Region};

/// Fuzz target that interprets a byte slice as a sequence of arena
/// operations.
///
/// Each operation is encoded as:
///   byte 0: opcode (0=first-fit alloc, 1=free, 2=resize, 3=best-fit alloc)
///   byte 1-2: size (little-endian u16)
///   byte 3: slot index (which tracked region to operate on)
///
/// Every live slot keeps its payload filled with a slot-specific byte;
/// the fill is verified before frees and across resizes, so any block
/// overlap or tag mishap shows up as a pattern mismatch. The integrity
/// walk runs every few operations and at the end.
const MAX_SLOTS: usize = 16;

const CHECK_EVERY: usize = 16;

fn seed(slot: usize) -> u8 {
    0x5A ^ slot as u8
}

fn verify(a: &Arena, r: Region, pattern: u8, len: usize) {
    let payload = a.payload(r);
    assert!(
        payload[..len].iter().all(|&b| b == pattern),
        "payload pattern lost for region at {}",
        r.offset()
    );
}

fuzz_target!(|data: &[u8]| {
    let mut arena = Arena::with_options(ArenaOptions {
        chunk_size: 4096,
        max_size: Some(1 << 20),
        growth_disabled: false,
    });
    let mut slots: [Option<Region>; MAX_SLOTS] = [None; MAX_SLOTS];

    let mut op_count = 0usize;
    let mut i = 0;
    while i + 4 <= data.len() {
        let opcode = data[i] & 0x03;
        let size = u16::from_le_bytes([data[i + 1], data[i + 2]]) as usize;
        let slot = (data[i + 3] as usize) % MAX_SLOTS;
        i += 4;

        match opcode {
            0 | 3 => {
                if let Some(r) = slots[slot].take() {
                    verify(&arena, r, seed(slot), arena.usable_size(r));
                    arena.free(Some(r));
                }
                let got = if opcode == 0 {
                    arena.allocate_first_fit(size)
                } else {
                    arena.allocate_best_fit(size)
                };
                if let Some(r) = got {
                    assert!(arena.usable_size(r) >= size);
                    arena.payload_mut(r).fill(seed(slot));
                }
                slots[slot] = got;
            }
            1 => {
                if let Some(r) = slots[slot].take() {
                    verify(&arena, r, seed(slot), arena.usable_size(r));
                    arena.free(Some(r));
                }
            }
            2 => {
                let old = slots[slot];
                let old_usable = old.map_or(0, |r| arena.usable_size(r));
                match arena.resize(old, size) {
                    Some(r) => {
                        // Old bytes must survive the move or in-place
                        // growth; fresh tail bytes are unspecified.
                        verify(&arena, r, seed(slot), old_usable);
                        arena.payload_mut(r).fill(seed(slot));
                        slots[slot] = Some(r);
                    }
                    None => {
                        // Failure leaves the original untouched.
                        if let Some(r) = old {
                            verify(&arena, r, seed(slot), old_usable);
                        }
                    }
                }
            }
            _ => unreachable!(),
        }

        op_count += 1;
        if op_count % CHECK_EVERY == 0 {
            arena.check_integrity();
        }
    }

    for (idx, slot) in slots.iter_mut().enumerate() {
        if let Some(r) = slot.take() {
            verify(&arena, r, seed(idx), arena.usable_size(r));
            arena.free(Some(r));
        }
    }

    let stats = arena.check_integrity();
    assert_eq!(stats.allocated_bytes, 0, "cleanup left live blocks behind");
});
