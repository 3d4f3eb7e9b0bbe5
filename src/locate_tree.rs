//! Batched `locate` over an entire cursor range, amortizing sampled-SA lookups by
//! climbing the LF-graph as a tree instead of walking each position independently.
//!
//! The same occurrence multiset as [`BiFmIndex::locate`] is produced, but positions
//! that share a path through the BWT share the bulk [`TextWithRankSupport::all_ranks`]
//! call that advances them one LF-step, instead of each doing its own `σ`-symbol probe.

use crate::block::Block;
use crate::text_with_rank_support::TextWithRankSupport;
use crate::{BiFmIndex, HalfOpenInterval, Hit, IndexStorage};

struct Frame {
    range: std::ops::Range<usize>,
    depth: usize,
}

/// A non-restartable iterator over every occurrence in a cursor's range, computed by
/// recursively splitting the range on BWT symbol until each sub-range is either fully
/// resolved against the sampled suffix array or `max_depth` is exceeded.
pub struct LocateFMTree<'a, I, B> {
    index: &'a BiFmIndex<I, B>,
    max_depth: usize,
    stack: Vec<Frame>,
    pending: std::collections::VecDeque<Hit>,
}

impl<'a, I: IndexStorage, B: Block> LocateFMTree<'a, I, B> {
    pub(crate) fn new(index: &'a BiFmIndex<I, B>, interval: HalfOpenInterval, max_depth: usize) -> Self {
        Self {
            index,
            max_depth,
            stack: vec![Frame {
                range: interval.start..interval.end,
                depth: 0,
            }],
            pending: std::collections::VecDeque::new(),
        }
    }

    /// Processes stack frames until at least one hit is ready (or the stack is
    /// exhausted), pushing resolved hits into `self.pending`.
    fn advance(&mut self) {
        while self.pending.is_empty() {
            let Some(Frame { range, depth }) = self.stack.pop() else {
                return;
            };

            if range.is_empty() {
                continue;
            }

            if depth > self.max_depth {
                for idx in range {
                    let resolved = self
                        .index
                        .suffix_array
                        .recover_one_from_depth(idx, depth, self.index);
                    let (text_id, position) = self
                        .index
                        .text_ids
                        .backtransform_concatenated_text_index(resolved);
                    self.pending.push_back(Hit { text_id, position });
                }
                continue;
            }

            let mut i = range.start;

            while i < range.end {
                if let Some(value) = self.index.suffix_array.try_resolve(i) {
                    let resolved = value + depth;
                    let (text_id, position) = self
                        .index
                        .text_ids
                        .backtransform_concatenated_text_index(resolved);
                    self.pending.push_back(Hit { text_id, position });
                    i += 1;
                    continue;
                }

                let run_start = i;
                while i < range.end && self.index.suffix_array.try_resolve(i).is_none() {
                    i += 1;
                }
                let run_end = i;

                let ranks_start = self.index.forward_rank.all_ranks(run_start);
                let ranks_end = self.index.forward_rank.all_ranks(run_end);

                for c in 0..self.index.alphabet.num_dense_symbols() {
                    let lo = self.index.count[c] + ranks_start[c];
                    let hi = self.index.count[c] + ranks_end[c];

                    if hi > lo {
                        self.stack.push(Frame {
                            range: lo..hi,
                            depth: depth + 1,
                        });
                    }
                }
            }
        }
    }
}

impl<'a, I: IndexStorage, B: Block> Iterator for LocateFMTree<'a, I, B> {
    type Item = Hit;

    fn next(&mut self) -> Option<Hit> {
        if self.pending.is_empty() {
            self.advance();
        }

        self.pending.pop_front()
    }
}

impl<I: IndexStorage, B: Block> BiFmIndex<I, B> {
    /// Locates every occurrence represented by `cursor`'s range, batching sampled
    /// suffix array lookups across the whole range rather than resolving each position
    /// independently. `max_depth` bounds how many LF-steps a branch of the search tree
    /// may take before falling back to a direct (but still correct) per-position walk;
    /// it trades construction-time memory (a larger sampling rate) against locate-time
    /// work in the same way [`BiFmIndex::locate`]'s linear strategy does, but amortized
    /// over the whole range instead of paid per position.
    pub fn locate_tree(
        &self,
        cursor: &crate::BiCursor<'_, I, B>,
        max_depth: usize,
    ) -> LocateFMTree<'_, I, B> {
        LocateFMTree::new(self, cursor.forward_interval(), max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BiFmIndexConfig, alphabet};
    use std::collections::HashMap;

    #[test]
    fn matches_linear_locate() {
        let texts = [
            b"AAACAAABAAA".as_slice(),
            b"AAABAAACAAA".as_slice(),
        ];
        let alph = alphabet::Alphabet::custom(
            {
                let mut table = [255u8; 256];
                table[b'A' as usize] = 1;
                table[b'B' as usize] = 2;
                table[b'C' as usize] = 3;
                table
            },
            4,
            3,
        );

        let index = BiFmIndexConfig::<i32>::new()
            .suffix_array_sampling_rate(4)
            .construct_index(texts, alph)
            .unwrap();

        let mut cursor = index.cursor_empty();
        cursor.extend_left(b'A');
        cursor.extend_left(b'A');
        cursor.extend_left(b'A');

        let tree_results: Vec<Hit> = index.locate_tree(&cursor, 3).collect();
        let mut linear_results: Vec<Hit> = cursor.locate().collect();

        let mut tree_counts: HashMap<Hit, usize> = HashMap::new();
        for hit in &tree_results {
            *tree_counts.entry(*hit).or_insert(0) += 1;
        }

        let mut linear_counts: HashMap<Hit, usize> = HashMap::new();
        for hit in linear_results.drain(..) {
            *linear_counts.entry(hit).or_insert(0) += 1;
        }

        assert_eq!(tree_counts, linear_counts);
        assert_eq!(tree_results.len(), 6);
    }
}
