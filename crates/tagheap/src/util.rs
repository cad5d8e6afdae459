/// Alignment unit for every block boundary, tag record, and payload size.
pub const ALIGN: usize = 8;

/// Size of the prefix (header) record in bytes. Holds the suffix offset
/// and the allocated flag, padded so payloads stay 8-byte aligned.
pub const PREFIX_SIZE: usize = 16;

/// Size of the suffix (footer) record in bytes. Holds the prefix offset.
pub const SUFFIX_SIZE: usize = 8;

/// Per-block tag overhead.
pub const TAG_OVERHEAD: usize = PREFIX_SIZE + SUFFIX_SIZE;

/// Default growth increment for the arena.
pub const DEFAULT_CHUNK: usize = 0x100000; // 1 MiB

/// Smallest remainder worth splitting off as its own free block: a tag
/// pair plus one aligned payload unit.
pub const MIN_REMAINDER: usize = TAG_OVERHEAD + ALIGN;

/// Align `value` up to the next multiple of `align`.
/// `align` must be a power of two.
#[inline(always)]
pub const fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Check if `value` is aligned to `align`.
/// `align` must be a power of two.
#[inline(always)]
pub const fn is_aligned(value: usize, align: usize) -> bool {
    debug_assert!(align.is_power_of_two());
    value & (align - 1) == 0
}

/// Round a requested size up to the block alignment unit.
/// `size` must not exceed `usize::MAX - 7`.
#[inline(always)]
pub const fn align8(size: usize) -> usize {
    align_up(size, ALIGN)
}

/// Overflow-checked [`align8`]: `None` when the rounded size would not
/// fit in `usize`. A size that large is unsatisfiable by construction,
/// since no block can span the whole address space.
#[inline(always)]
pub const fn checked_align8(size: usize) -> Option<usize> {
    match size.checked_add(ALIGN - 1) {
        Some(padded) => Some(padded & !(ALIGN - 1)),
        None => None,
    }
}
