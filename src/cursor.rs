use crate::{
    BiFmIndex, FmIndex, HalfOpenInterval, Hit, IndexStorage, block::Block,
    text_with_rank_support::TextWithRankSupport,
};

/// A cursor to the unidirectional [`FmIndex`].
///
/// The cursor API allows more flexible search procedures than [`FmIndex::count`] /
/// [`FmIndex::locate`]. It implicitly maintains a currently searched query; symbols can
/// iteratively be added to the front of this query, corresponding to a standard
/// backward search.
#[derive(Clone, Copy)]
pub struct Cursor<'a, I, R> {
    pub(crate) index: &'a FmIndex<I, R>,
    pub(crate) interval: HalfOpenInterval,
}

impl<'a, I: IndexStorage, R: Block> Cursor<'a, I, R> {
    /// Extends the currently searched query at the front by one symbol. Running time is
    /// in O(1).
    pub fn extend_query_front(&mut self, symbol: u8) {
        let symbol = self.index.alphabet.io_to_dense_representation(symbol);
        self.extend_front_without_alphabet_translation(symbol);
    }

    pub(crate) fn extend_front_without_alphabet_translation(&mut self, symbol: u8) {
        let (start, end) = if self.interval.start != self.interval.end {
            (
                self.index.lf_mapping_step(symbol, self.interval.start),
                self.index.lf_mapping_step(symbol, self.interval.end),
            )
        } else {
            (self.interval.start, self.interval.end)
        };

        self.interval = HalfOpenInterval { start, end };
    }

    pub(crate) fn interval(&self) -> HalfOpenInterval {
        self.interval
    }

    /// Returns the number of occurrences of the currently searched query. Running time
    /// is in O(1).
    pub fn count(&self) -> usize {
        self.interval.len()
    }

    /// Returns an iterator over all occurrences of the currently searched query.
    pub fn locate(&self) -> impl Iterator<Item = Hit> {
        unsafe { self.index.locate_interval(self.interval) }
    }
}

/// A cursor to the [`BiFmIndex`].
///
/// Maintains a currently searched query that can be extended on either side via
/// [`extend_left`](Self::extend_left) and [`extend_right`](Self::extend_right), using
/// the classic bidirectional backward-search update (Lam et al. 2009): extending on one
/// side performs a backward-search step on that side's occurrence table, and the
/// opposite side's interval is updated from the same step's bulk rank computation,
/// without a second table scan.
#[derive(Clone, Copy)]
pub struct BiCursor<'a, I, B> {
    pub(crate) index: &'a BiFmIndex<I, B>,
    pub(crate) forward: HalfOpenInterval,
    pub(crate) reverse: HalfOpenInterval,
}

impl<'a, I: IndexStorage, B: Block> BiCursor<'a, I, B> {
    /// Prepends `symbol` to the currently searched query (standard backward search).
    pub fn extend_left(&mut self, symbol: u8) {
        let symbol = self.index.alphabet.io_to_dense_representation(symbol);
        self.extend_left_dense(symbol);
    }

    /// Appends `symbol` to the currently searched query.
    pub fn extend_right(&mut self, symbol: u8) {
        let symbol = self.index.alphabet.io_to_dense_representation(symbol);
        self.extend_right_dense(symbol);
    }

    pub(crate) fn extend_left_dense(&mut self, symbol: u8) {
        if self.forward.len() == 0 {
            return;
        }

        let c = symbol as usize;
        let (ranks_start, prefix_start) = self.index.forward_rank.all_ranks_and_prefix_ranks(self.forward.start);
        let (ranks_end, prefix_end) = self.index.forward_rank.all_ranks_and_prefix_ranks(self.forward.end);

        let count_c = self.index.count[c];
        let new_low = count_c + ranks_start[c];
        let new_high = count_c + ranks_end[c];

        let smaller = prefix_end[c] - prefix_start[c];
        let new_low_rev = self.reverse.start + smaller;
        let new_high_rev = new_low_rev + (new_high - new_low);

        self.forward = HalfOpenInterval {
            start: new_low,
            end: new_high,
        };
        self.reverse = HalfOpenInterval {
            start: new_low_rev,
            end: new_high_rev,
        };
    }

    pub(crate) fn extend_right_dense(&mut self, symbol: u8) {
        if self.reverse.len() == 0 {
            return;
        }

        let c = symbol as usize;
        let (ranks_start, prefix_start) = self.index.reverse_rank.all_ranks_and_prefix_ranks(self.reverse.start);
        let (ranks_end, prefix_end) = self.index.reverse_rank.all_ranks_and_prefix_ranks(self.reverse.end);

        let count_c = self.index.count[c];
        let new_low_rev = count_c + ranks_start[c];
        let new_high_rev = count_c + ranks_end[c];

        let smaller = prefix_end[c] - prefix_start[c];
        let new_low = self.forward.start + smaller;
        let new_high = new_low + (new_high_rev - new_low_rev);

        self.reverse = HalfOpenInterval {
            start: new_low_rev,
            end: new_high_rev,
        };
        self.forward = HalfOpenInterval {
            start: new_low,
            end: new_high,
        };
    }

    pub(crate) fn forward_interval(&self) -> HalfOpenInterval {
        self.forward
    }

    pub(crate) fn reverse_interval(&self) -> HalfOpenInterval {
        self.reverse
    }

    /// Returns the number of occurrences of the currently searched query.
    pub fn count(&self) -> usize {
        self.forward.len()
    }

    /// Returns an iterator over all occurrences of the currently searched query.
    pub fn locate(&self) -> impl Iterator<Item = Hit> {
        unsafe { self.index.locate_interval(self.forward) }
    }
}
