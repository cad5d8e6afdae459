use log::{debug, trace};

use crate::config;
use crate::region::Region;
use crate::tag::{self, Prefix};
use crate::util::{
    ALIGN, DEFAULT_CHUNK, PREFIX_SIZE, SUFFIX_SIZE, TAG_OVERHEAD, checked_align8, is_aligned,
};

/// Construction options for an [`Arena`].
#[derive(Clone, Debug)]
pub struct ArenaOptions {
    /// Growth increment. Requests needing more than one chunk grow by
    /// exactly what they need instead.
    pub chunk_size: usize,
    /// Hard cap on total arena size. Initialization or growth that would
    /// push the arena past the cap fails like any other growth denial.
    pub max_size: Option<usize>,
    /// Per-arena growth switch. `default()` samples the process-wide
    /// setting from [`config::growth_disabled`].
    pub growth_disabled: bool,
}

impl Default for ArenaOptions {
    fn default() -> Self {
        ArenaOptions {
            chunk_size: DEFAULT_CHUNK,
            max_size: None,
            growth_disabled: config::growth_disabled(),
        }
    }
}

/// Totals gathered by [`Arena::check_integrity`].
///
/// `allocated_bytes + free_bytes + blocks * TAG_OVERHEAD == arena_size`
/// holds for every well-formed arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub blocks: usize,
    pub allocated_bytes: usize,
    pub free_bytes: usize,
    pub arena_size: usize,
}

/// One entry yielded by [`Arena::blocks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Handle for the block's payload. Payload contents are meaningful
    /// only while the block is allocated.
    pub region: Region,
    /// Usable payload bytes.
    pub usable: usize,
    pub allocated: bool,
}

/// A growable heap arena tiled by boundary-tagged blocks.
///
/// The arena owns a single byte buffer. Every block is
/// `prefix | payload | suffix`; the tags let the allocator walk the
/// chain in both directions, so freeing can merge neighbors in O(1) and
/// resizing can absorb an adjacent free block without copying. Blocks
/// tile the buffer exactly: the byte after one block's suffix is the
/// next block's prefix, or the end of the arena.
///
/// All mutating operations take `&mut self`; the single-owner model
/// replaces locking.
pub struct Arena {
    pub(crate) buf: Vec<u8>,
    chunk_size: usize,
    max_size: Option<usize>,
    growth_disabled: bool,
}

impl Arena {
    /// New empty arena with default options. The buffer is not reserved
    /// until the first allocation.
    pub fn new() -> Arena {
        Arena::with_options(ArenaOptions::default())
    }

    pub fn with_options(opts: ArenaOptions) -> Arena {
        Arena {
            buf: Vec::new(),
            // A chunk must hold at least one zero-payload block. Chunks
            // too big to round saturate and fail at reserve time.
            chunk_size: checked_align8(opts.chunk_size.max(TAG_OVERHEAD))
                .unwrap_or(usize::MAX & !(ALIGN - 1)),
            max_size: opts.max_size,
            growth_disabled: opts.growth_disabled,
        }
    }

    /// Current arena size in bytes (0 before the first allocation).
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    pub fn is_initialized(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Format the first chunk as one spanning free block. Idempotent.
    /// Returns false when the buffer cannot be reserved or the size cap
    /// is smaller than one chunk.
    pub(crate) fn ensure_initialized(&mut self) -> bool {
        if !self.buf.is_empty() {
            return true;
        }
        let chunk = self.chunk_size;
        if self.max_size.is_some_and(|cap| chunk > cap) {
            trace!("init denied: chunk {chunk} exceeds size cap");
            return false;
        }
        if self.buf.try_reserve_exact(chunk).is_err() {
            return false;
        }
        self.buf.resize(chunk, 0);
        self.make_free_block(0, chunk);
        debug!("arena initialized, {chunk} bytes");
        true
    }

    /// Append at least `min_size` usable bytes to the arena, format the
    /// new range as a free block, and merge it with the old tail block
    /// if that block is free. Returns the prefix offset of the resulting
    /// block, or None when growth is denied or the host refuses memory.
    #[cold]
    #[inline(never)]
    pub(crate) fn grow(&mut self, min_size: usize) -> Option<usize> {
        if self.growth_disabled {
            trace!("grow denied: growth disabled");
            return None;
        }
        let Some(needed) = checked_align8(min_size).and_then(|s| s.checked_add(TAG_OVERHEAD))
        else {
            trace!("grow denied: no block can hold {min_size} bytes");
            return None;
        };
        let grow_by = needed.max(self.chunk_size);
        if let Some(cap) = self.max_size
            && self.buf.len().checked_add(grow_by).is_none_or(|len| len > cap)
        {
            trace!(
                "grow denied: {} + {grow_by} exceeds size cap {cap}",
                self.buf.len()
            );
            return None;
        }
        let old_len = self.buf.len();
        if self.buf.try_reserve_exact(grow_by).is_err() {
            trace!("grow denied: reservation of {grow_by} bytes failed");
            return None;
        }
        self.buf.resize(old_len + grow_by, 0);
        debug!("arena grew, {old_len} -> {} bytes", self.buf.len());
        let p = self.make_free_block(old_len, grow_by);
        let p = self.coalesce_prev(p);
        debug_assert!(self.usable_space(p) >= min_size);
        Some(p)
    }

    /// Write a complete free block (prefix and suffix) spanning
    /// `[at, at + size)`. Returns `at`.
    pub(crate) fn make_free_block(&mut self, at: usize, size: usize) -> usize {
        debug_assert!(is_aligned(at, ALIGN));
        debug_assert!(is_aligned(size, ALIGN));
        debug_assert!(size >= TAG_OVERHEAD);
        let suffix = at + size - SUFFIX_SIZE;
        tag::write_prefix(
            &mut self.buf,
            at,
            Prefix {
                suffix,
                allocated: false,
            },
        );
        tag::write_suffix(&mut self.buf, suffix, at);
        at
    }

    /// Usable payload bytes of the block whose prefix is at `prefix`.
    pub(crate) fn usable_space(&self, prefix: usize) -> usize {
        tag::read_prefix(&self.buf, prefix).suffix - (prefix + PREFIX_SIZE)
    }

    pub(crate) fn is_free(&self, prefix: usize) -> bool {
        !tag::read_prefix(&self.buf, prefix).allocated
    }

    /// Prefix offset of the next block, or None past the last block.
    pub(crate) fn next_prefix(&self, prefix: usize) -> Option<usize> {
        let next = tag::read_prefix(&self.buf, prefix).suffix + SUFFIX_SIZE;
        (next < self.buf.len()).then_some(next)
    }

    /// Prefix offset of the previous block, found through the suffix
    /// record that ends where this block begins. None for the first block.
    pub(crate) fn prev_prefix(&self, prefix: usize) -> Option<usize> {
        if prefix == 0 {
            return None;
        }
        Some(tag::read_suffix(&self.buf, prefix - SUFFIX_SIZE))
    }

    pub(crate) fn read_prefix(&self, prefix: usize) -> Prefix {
        tag::read_prefix(&self.buf, prefix)
    }

    pub(crate) fn set_allocated(&mut self, prefix: usize, allocated: bool) {
        tag::set_allocated(&mut self.buf, prefix, allocated);
    }

    /// Usable payload bytes behind `region`.
    pub fn usable_size(&self, region: Region) -> usize {
        self.usable_space(region.prefix())
    }

    /// The payload bytes behind `region`.
    pub fn payload(&self, region: Region) -> &[u8] {
        let suffix = tag::read_prefix(&self.buf, region.prefix()).suffix;
        &self.buf[region.offset()..suffix]
    }

    pub fn payload_mut(&mut self, region: Region) -> &mut [u8] {
        let suffix = tag::read_prefix(&self.buf, region.prefix()).suffix;
        &mut self.buf[region.offset()..suffix]
    }

    /// Iterate blocks in address order.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            arena: self,
            at: if self.buf.is_empty() { None } else { Some(0) },
        }
    }

    /// Walk the whole block chain, asserting every structural invariant,
    /// and return the accumulated totals.
    ///
    /// Checks per block: tags in bounds and aligned, the suffix points
    /// back at its prefix, the flag byte is 0 or 1, and no two adjacent
    /// blocks are both free. The chain must end exactly at the arena
    /// end. Panics on the first violation; a violated invariant means
    /// the allocator's own bookkeeping went wrong, and no further
    /// operation on the arena would be meaningful.
    pub fn check_integrity(&self) -> ArenaStats {
        let mut stats = ArenaStats {
            arena_size: self.buf.len(),
            ..ArenaStats::default()
        };
        let mut at = 0;
        let mut prev_free: Option<usize> = None;
        while at < self.buf.len() {
            assert!(
                is_aligned(at, ALIGN) && at + PREFIX_SIZE <= self.buf.len(),
                "prefix at {at} is misaligned or overruns arena end {}",
                self.buf.len()
            );
            let p = tag::read_prefix(&self.buf, at);
            let flag = tag::read_flag(&self.buf, at);
            assert!(flag <= 1, "block at {at}: flag byte is {flag}, want 0 or 1");
            assert!(
                p.suffix >= at + PREFIX_SIZE,
                "block at {at}: suffix offset {} precedes its payload",
                p.suffix
            );
            assert!(
                is_aligned(p.suffix, ALIGN) && p.suffix + SUFFIX_SIZE <= self.buf.len(),
                "block at {at}: suffix offset {} is misaligned or out of bounds",
                p.suffix
            );
            let back = tag::read_suffix(&self.buf, p.suffix);
            assert!(
                back == at,
                "suffix at {} points back to {back}, want {at}",
                p.suffix
            );
            let usable = p.suffix - (at + PREFIX_SIZE);
            trace!("block at {at}: usable={usable} allocated={}", p.allocated);
            if p.allocated {
                stats.allocated_bytes += usable;
            } else {
                if let Some(prev) = prev_free {
                    panic!("adjacent free blocks at {prev} and {at}");
                }
                stats.free_bytes += usable;
            }
            prev_free = (!p.allocated).then_some(at);
            stats.blocks += 1;
            at = p.suffix + SUFFIX_SIZE;
        }
        assert!(
            at == self.buf.len(),
            "block chain ends at {at}, arena ends at {}",
            self.buf.len()
        );
        debug!(
            "arena check: blocks={} allocated={} free={} size={}",
            stats.blocks, stats.allocated_bytes, stats.free_bytes, stats.arena_size
        );
        stats
    }
}

impl Default for Arena {
    fn default() -> Arena {
        Arena::new()
    }
}

/// Address-ordered block iterator, see [`Arena::blocks`].
pub struct Blocks<'a> {
    arena: &'a Arena,
    at: Option<usize>,
}

impl Iterator for Blocks<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        let at = self.at?;
        let p = self.arena.read_prefix(at);
        self.at = self.arena.next_prefix(at);
        Some(BlockInfo {
            region: Region::from_prefix(at),
            usable: p.suffix - (at + PREFIX_SIZE),
            allocated: p.allocated,
        })
    }
}
