use log::trace;

use crate::arena::Arena;
use crate::region::Region;
use crate::search::SearchMode;
use crate::util::{MIN_REMAINDER, PREFIX_SIZE, SUFFIX_SIZE, checked_align8};

impl Arena {
    /// Allocate at least `size` usable bytes with the given policy.
    ///
    /// The size is rounded up to the 8-byte block unit. When the chosen
    /// free block is large enough to leave a viable remainder, it is
    /// split and the remainder stays free; otherwise the caller gets the
    /// whole block, slack included. Returns `None` when no free block
    /// fits and the arena cannot grow, and for sizes so large the block
    /// arithmetic would overflow `usize`; no tag has been written in
    /// either case.
    pub fn allocate(&mut self, size: usize, mode: SearchMode) -> Option<Region> {
        if !self.ensure_initialized() {
            return None;
        }
        let asize = checked_align8(size)?;
        let p = self.find_fit(asize, mode)?;
        let usable = self.usable_space(p);
        debug_assert!(usable >= asize);
        if usable - asize >= MIN_REMAINDER {
            self.split(p, asize);
        }
        self.set_allocated(p, true);
        let region = Region::from_prefix(p);
        trace!("allocate {size} ({mode:?}): region at {}", region.offset());
        Some(region)
    }

    /// [`allocate`](Arena::allocate) with [`SearchMode::FirstFit`].
    pub fn allocate_first_fit(&mut self, size: usize) -> Option<Region> {
        self.allocate(size, SearchMode::FirstFit)
    }

    /// [`allocate`](Arena::allocate) with [`SearchMode::BestFit`].
    pub fn allocate_best_fit(&mut self, size: usize) -> Option<Region> {
        self.allocate(size, SearchMode::BestFit)
    }

    /// Carve the free block at `p` down to an `asize` payload and turn
    /// the tail into a new free block. The caller has checked that the
    /// remainder is at least `MIN_REMAINDER` bytes.
    fn split(&mut self, p: usize, asize: usize) {
        let end = self.read_prefix(p).suffix + SUFFIX_SIZE;
        let sliver = p + PREFIX_SIZE + SUFFIX_SIZE + asize;
        self.make_free_block(sliver, end - sliver);
        self.make_free_block(p, sliver - p);
        trace!("split block at {p}: payload {asize}, remainder at {sliver}");
    }

    /// Release a region. `None` is a no-op. The freed block is merged
    /// with whichever neighbors are free, both directions, so no two
    /// adjacent free blocks survive the call.
    pub fn free(&mut self, region: Option<Region>) {
        let Some(r) = region else { return };
        let p = r.prefix();
        self.set_allocated(p, false);
        self.coalesce(p);
        trace!("freed region at {}", r.offset());
    }

    /// Merge the block at `p` with its previous neighbor, then the
    /// survivor with its next neighbor, wherever both sides of a merge
    /// are free. Returns the surviving prefix.
    pub(crate) fn coalesce(&mut self, p: usize) -> usize {
        let merged = self.coalesce_prev(p);
        if let Some(next) = self.next_prefix(merged) {
            self.coalesce_prev(next);
        }
        merged
    }

    /// Absorb the block at `p` into its previous neighbor if both are
    /// free, re-tagging the neighbor to span the pair. Returns the
    /// surviving prefix.
    pub(crate) fn coalesce_prev(&mut self, p: usize) -> usize {
        if let Some(prev) = self.prev_prefix(p)
            && self.is_free(p)
            && self.is_free(prev)
        {
            let end = self.read_prefix(p).suffix + SUFFIX_SIZE;
            trace!("coalesce: block at {prev} absorbs block at {p}");
            return self.make_free_block(prev, end - prev);
        }
        p
    }
}
