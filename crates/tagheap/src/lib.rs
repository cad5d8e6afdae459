//! A boundary-tag heap arena with pluggable free-block search.
//!
//! The arena owns one contiguous growable buffer and tiles it with
//! blocks carrying a header/footer tag pair, so neighbors are reachable
//! in both directions: frees coalesce adjacent free blocks eagerly, and
//! resizes absorb a free neighbor before falling back to a copying
//! move. Callers hold [`Region`] handles (validated offsets, not
//! pointers) and read or write payload bytes through the arena.
//!
//! ```
//! let mut arena = tagheap::Arena::new();
//!
//! let r = arena.allocate_first_fit(64).expect("arena can grow");
//! arena.payload_mut(r)[..5].copy_from_slice(b"hello");
//!
//! // Grows in place here: the neighboring block is free.
//! let r = arena.resize(Some(r), 4096).expect("resize");
//! assert_eq!(&arena.payload(r)[..5], b"hello");
//!
//! arena.free(Some(r));
//! assert_eq!(arena.check_integrity().allocated_bytes, 0);
//! ```

mod alloc;
mod arena;
pub mod config;
mod region;
mod resize;
mod search;
mod tag;
mod util;

pub use arena::{Arena, ArenaOptions, ArenaStats, BlockInfo, Blocks};
pub use region::Region;
pub use search::SearchMode;
pub use util::{ALIGN, DEFAULT_CHUNK, MIN_REMAINDER, PREFIX_SIZE, SUFFIX_SIZE, TAG_OVERHEAD, align8};
