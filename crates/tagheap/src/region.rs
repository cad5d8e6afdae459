use crate::util::PREFIX_SIZE;

/// Caller-facing handle to an allocated payload.
///
/// A `Region` is an offset into the arena that minted it, not a pointer:
/// it stays meaningful when the arena's buffer reallocates during growth.
/// It is invalidated by `free` and by any `resize` that returns a
/// different handle; using a stale handle yields unspecified payload
/// bytes, or panics on the slice bounds check when the bytes where its
/// tag used to live no longer decode to an in-range block. It cannot
/// touch memory outside the arena either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    payload: usize,
}

impl Region {
    /// Handle for the block whose prefix record sits at `prefix`.
    pub(crate) fn from_prefix(prefix: usize) -> Region {
        Region {
            payload: prefix + PREFIX_SIZE,
        }
    }

    /// Offset of the owning block's prefix record.
    pub(crate) fn prefix(self) -> usize {
        self.payload - PREFIX_SIZE
    }

    /// Absolute byte offset of the payload within its arena.
    pub fn offset(self) -> usize {
        self.payload
    }
}
