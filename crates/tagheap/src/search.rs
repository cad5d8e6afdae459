use log::trace;

use crate::arena::Arena;

/// Free-block search policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Take the first free block that fits. Cheapest scan, biased toward
    /// low offsets, tends to fragment the front of the arena.
    FirstFit,
    /// Scan the whole chain and take the tightest fit, lowest offset on
    /// ties. Full O(n) scan in exchange for less fragmentation.
    BestFit,
}

impl Arena {
    pub(crate) fn find_fit(&mut self, size: usize, mode: SearchMode) -> Option<usize> {
        match mode {
            SearchMode::FirstFit => self.find_first_fit(size),
            SearchMode::BestFit => self.find_best_fit(size),
        }
    }

    /// First free block with usable space >= `size`. Falls back to
    /// growing the arena when the scan misses.
    pub(crate) fn find_first_fit(&mut self, size: usize) -> Option<usize> {
        let mut at = if self.is_initialized() { Some(0) } else { None };
        while let Some(p) = at {
            if self.is_free(p) && self.usable_space(p) >= size {
                trace!("first fit for {size}: block at {p}");
                return Some(p);
            }
            at = self.next_prefix(p);
        }
        trace!("first fit for {size}: no block, growing");
        self.grow(size)
    }

    /// Smallest free block with usable space >= `size`, or growth on a
    /// miss. Ties resolve to the first block encountered.
    pub(crate) fn find_best_fit(&mut self, size: usize) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        let mut at = if self.is_initialized() { Some(0) } else { None };
        while let Some(p) = at {
            if self.is_free(p) {
                let usable = self.usable_space(p);
                if usable >= size && best.is_none_or(|(_, b)| usable < b) {
                    best = Some((p, usable));
                }
            }
            at = self.next_prefix(p);
        }
        if let Some((p, usable)) = best {
            trace!("best fit for {size}: block at {p}, usable {usable}");
            return Some(p);
        }
        trace!("best fit for {size}: no block, growing");
        self.grow(size)
    }
}
