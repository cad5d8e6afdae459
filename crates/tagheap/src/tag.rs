//! Boundary-tag records, encoded and decoded at byte offsets.
//!
//! A block is laid out as `prefix | payload | suffix`. The prefix stores
//! the absolute buffer offset of the block's suffix plus an allocated
//! flag; the suffix stores the offset of the prefix. Offsets are absolute
//! so they stay valid when the buffer reallocates on growth. Both records
//! use fixed little-endian layouts rather than struct casts, so every
//! access is a bounds-checked slice operation.

use crate::util::PREFIX_SIZE;

/// Byte position of the allocated flag within a prefix record.
const FLAG_OFFSET: usize = 8;

/// Decoded prefix (header) record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Prefix {
    /// Absolute offset of this block's suffix record.
    pub suffix: usize,
    /// Whether the payload is currently handed out.
    pub allocated: bool,
}

/// Write a complete prefix record at `at`, padding bytes zeroed.
pub(crate) fn write_prefix(buf: &mut [u8], at: usize, prefix: Prefix) {
    buf[at..at + 8].copy_from_slice(&(prefix.suffix as u64).to_le_bytes());
    buf[at + FLAG_OFFSET] = prefix.allocated as u8;
    buf[at + FLAG_OFFSET + 1..at + PREFIX_SIZE].fill(0);
}

/// Read the prefix record at `at`.
pub(crate) fn read_prefix(buf: &[u8], at: usize) -> Prefix {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[at..at + 8]);
    Prefix {
        suffix: u64::from_le_bytes(raw) as usize,
        allocated: buf[at + FLAG_OFFSET] != 0,
    }
}

/// Overwrite only the allocated flag of the prefix at `at`.
pub(crate) fn set_allocated(buf: &mut [u8], at: usize, allocated: bool) {
    buf[at + FLAG_OFFSET] = allocated as u8;
}

/// Raw flag byte of the prefix at `at`, for integrity diagnostics.
/// Valid arenas only ever contain 0 or 1 here.
pub(crate) fn read_flag(buf: &[u8], at: usize) -> u8 {
    buf[at + FLAG_OFFSET]
}

/// Write a suffix record at `at`: the back-offset of the owning prefix.
pub(crate) fn write_suffix(buf: &mut [u8], at: usize, prefix: usize) {
    buf[at..at + 8].copy_from_slice(&(prefix as u64).to_le_bytes());
}

/// Read the prefix back-offset stored in the suffix record at `at`.
pub(crate) fn read_suffix(buf: &[u8], at: usize) -> usize {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(raw) as usize
}
