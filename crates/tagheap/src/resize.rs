//! In-place-first resizing.
//!
//! Growth prefers absorbing a free neighbor over moving the payload: a
//! free successor can donate bytes from its front with no copy at all,
//! and a free predecessor can take the block's header shifted down into
//! it, costing one overlapping payload copy but no fresh allocation.
//! Only when both neighbors refuse does resize fall back to
//! allocate-copy-free. Every block whose boundary moves gets complete
//! prefix and suffix records rewritten, so the chain stays walkable in
//! both directions at every step.

use log::trace;

use crate::arena::Arena;
use crate::region::Region;
use crate::search::SearchMode;
use crate::tag::{self, Prefix};
use crate::util::{PREFIX_SIZE, SUFFIX_SIZE, checked_align8};

impl Arena {
    /// Resize a region to at least `new_size` usable bytes.
    ///
    /// `None` behaves as a fresh best-fit allocation. A region that
    /// already covers `new_size` is returned unchanged (shrinking is a
    /// no-op). Otherwise the block grows in place into a free successor
    /// or predecessor when one has room, else the contents move to a
    /// fresh best-fit region and the old one is freed. Returns `None`
    /// when that final allocation fails or `new_size` is too large for
    /// any block; the original region is still valid and untouched in
    /// that case.
    pub fn resize(&mut self, region: Option<Region>, new_size: usize) -> Option<Region> {
        let Some(r) = region else {
            trace!("resize of empty region: fresh allocation of {new_size}");
            return self.allocate(new_size, SearchMode::BestFit);
        };
        let cur = r.prefix();
        let old_usable = self.usable_space(cur);
        if old_usable >= new_size {
            return Some(r);
        }
        let needed = checked_align8(new_size - old_usable)?;

        if let Some(next) = self.next_prefix(cur)
            && self.is_free(next)
            && self.usable_space(next) >= needed
        {
            return Some(self.consume_successor(cur, next, needed));
        }

        if let Some(prev) = self.prev_prefix(cur)
            && self.is_free(prev)
            && self.usable_space(prev) >= needed
        {
            return Some(self.shift_into_predecessor(cur, prev, needed, old_usable));
        }

        let moved = self.allocate(new_size, SearchMode::BestFit)?;
        self.buf
            .copy_within(r.offset()..r.offset() + old_usable, moved.offset());
        self.free(Some(r));
        trace!("resize: region at {} moved to {}", r.offset(), moved.offset());
        Some(moved)
    }

    /// Extend the block at `cur` forward by `needed` bytes taken from
    /// the front of the free successor at `next`. No payload moves. The
    /// shrunken successor is rewritten as a complete free block, which
    /// may legitimately end up with zero usable bytes.
    fn consume_successor(&mut self, cur: usize, next: usize, needed: usize) -> Region {
        let next_suffix = self.read_prefix(next).suffix;
        let new_suffix = self.read_prefix(cur).suffix + needed;
        tag::write_prefix(
            &mut self.buf,
            cur,
            Prefix {
                suffix: new_suffix,
                allocated: true,
            },
        );
        tag::write_suffix(&mut self.buf, new_suffix, cur);
        let new_next = new_suffix + SUFFIX_SIZE;
        self.make_free_block(new_next, next_suffix + SUFFIX_SIZE - new_next);
        trace!("resize: block at {cur} absorbed {needed} bytes of successor at {next}");
        Region::from_prefix(cur)
    }

    /// Shift the block at `cur` down by `needed` bytes into the free
    /// predecessor at `prev`, then slide the payload after the moved
    /// header. The predecessor keeps its prefix position and shrinks
    /// from the back; both its records and the moved block's records are
    /// rewritten in full before the payload copy runs over the old
    /// header bytes.
    fn shift_into_predecessor(
        &mut self,
        cur: usize,
        prev: usize,
        needed: usize,
        old_usable: usize,
    ) -> Region {
        let suffix = self.read_prefix(cur).suffix;
        let new_cur = cur - needed;
        tag::write_prefix(
            &mut self.buf,
            prev,
            Prefix {
                suffix: new_cur - SUFFIX_SIZE,
                allocated: false,
            },
        );
        tag::write_suffix(&mut self.buf, new_cur - SUFFIX_SIZE, prev);
        tag::write_prefix(
            &mut self.buf,
            new_cur,
            Prefix {
                suffix,
                allocated: true,
            },
        );
        tag::write_suffix(&mut self.buf, suffix, new_cur);
        self.buf.copy_within(
            cur + PREFIX_SIZE..cur + PREFIX_SIZE + old_usable,
            new_cur + PREFIX_SIZE,
        );
        trace!("resize: block at {cur} shifted to {new_cur}, took {needed} bytes from {prev}");
        Region::from_prefix(new_cur)
    }
}
