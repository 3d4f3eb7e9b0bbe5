//! The compressed suffix array: every `sampling_rate`-th suffix array entry is kept,
//! plus every entry that marks a text border (needed to terminate the LF-mapping walk
//! used to recover unsampled entries).

use bytemuck::Pod;
use libsais::OutputElement;
use num_traits::{NumCast, PrimInt};

use std::{collections::HashMap, marker::PhantomData, ops::Range};

/// Anything that can answer the two questions needed to walk the LF-mapping backwards
/// from an unsampled suffix array position to the next sampled (or text-border) one.
pub(crate) trait LfMappingSource {
    fn bwt_symbol_at(&self, idx: usize) -> u8;
    fn lf_mapping_step(&self, symbol: u8, idx: usize) -> usize;
}

#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug)]
pub(crate) struct SampledSuffixArray<I> {
    suffix_array_bytes: Vec<u8>,
    text_border_lookup: HashMap<usize, I>,
    sampling_rate: usize,
    _compression_marker: PhantomData<I>,
}

impl<I: OutputElement> SampledSuffixArray<I> {
    pub(crate) fn new_uncompressed(
        mut suffix_array_bytes: Vec<u8>,
        sampling_rate: usize,
        text_border_lookup: HashMap<usize, I>,
    ) -> Self {
        let suffix_array_view: &mut [I] = bytemuck::cast_slice_mut(&mut suffix_array_bytes);

        let mut num_retained_values = 0;
        let mut write_index = 0;

        for i in 0..suffix_array_view.len() {
            if i % sampling_rate == 0 {
                suffix_array_view[write_index] = suffix_array_view[i];
                write_index += 1;
                num_retained_values += 1;
            }
        }

        suffix_array_bytes.truncate(num_retained_values * size_of::<I>());
        suffix_array_bytes.shrink_to_fit();

        Self {
            suffix_array_bytes,
            text_border_lookup,
            sampling_rate,
            _compression_marker: PhantomData,
        }
    }
}

impl SampledSuffixArray<u32> {
    /// Packs two `u32` sampled values into one `i64` slot of the (already `i64`-sized)
    /// construction buffer, halving the memory used by the sampled suffix array for the
    /// `u32` [`crate::IndexStorage`].
    pub(crate) fn new_u32_compressed(
        mut suffix_array_bytes: Vec<u8>,
        sampling_rate: usize,
        text_border_lookup: HashMap<usize, u32>,
    ) -> Self {
        let suffix_array_view: &mut [i64] = bytemuck::cast_slice_mut(&mut suffix_array_bytes);

        let mut num_retained_values: usize = 0;
        let mut write_index = 0;
        let mut next_write_is_little_half = true;

        for i in 0..suffix_array_view.len() {
            if i % sampling_rate == 0 {
                let read_entry_bytes = suffix_array_view[i].to_le_bytes();

                if next_write_is_little_half {
                    let mut new_write_entry_bytes = [0; 8];
                    new_write_entry_bytes[0..4].copy_from_slice(&read_entry_bytes[0..4]);
                    suffix_array_view[write_index] = i64::from_le_bytes(new_write_entry_bytes);
                    next_write_is_little_half = false;
                } else {
                    let mut existing_bytes = suffix_array_view[write_index].to_le_bytes();
                    existing_bytes[4..8].copy_from_slice(&read_entry_bytes[0..4]);
                    suffix_array_view[write_index] = i64::from_le_bytes(existing_bytes);
                    next_write_is_little_half = true;
                    write_index += 1;
                }

                num_retained_values += 1;
            }
        }

        suffix_array_bytes.truncate(num_retained_values * size_of::<u32>());
        suffix_array_bytes.shrink_to_fit();

        Self {
            suffix_array_bytes,
            text_border_lookup,
            sampling_rate,
            _compression_marker: PhantomData,
        }
    }
}

impl<I: PrimInt + Pod> SampledSuffixArray<I> {
    pub(crate) fn recover_range(
        &self,
        range: Range<usize>,
        index: &impl LfMappingSource,
    ) -> impl Iterator<Item = usize> {
        range.map(|mut i| {
            let mut num_steps_done = I::zero();

            while i % self.sampling_rate != 0 {
                let bwt_symbol = index.bwt_symbol_at(i);

                if bwt_symbol == 0 {
                    return <usize as NumCast>::from(self.text_border_lookup[&i] + num_steps_done)
                        .unwrap();
                }

                i = index.lf_mapping_step(bwt_symbol, i);
                num_steps_done = num_steps_done + I::one();
            }

            let suffix_array_view: &[I] = bytemuck::cast_slice(&self.suffix_array_bytes);

            <usize as NumCast>::from(suffix_array_view[i / self.sampling_rate] + num_steps_done)
                .unwrap()
        })
    }

    /// Recovers a single sampled suffix array position, without batching across a
    /// range. Used by [`crate::locate_tree::LocateFMTree`] when a subtree of the
    /// LF-graph is too small to benefit from a further split.
    pub(crate) fn recover_one(&self, idx: usize, index: &impl LfMappingSource) -> usize {
        self.recover_range(idx..idx + 1, index).next().unwrap()
    }

    /// Resolves `idx` directly, without walking the LF-mapping, iff it is a sampled
    /// position or a text border (the two cases [`recover_range`](Self::recover_range)
    /// can terminate on without further stepping). Returns the suffix array value with
    /// no depth offset added; the caller adds the number of LF-steps already taken.
    pub(crate) fn try_resolve(&self, idx: usize) -> Option<usize> {
        if idx % self.sampling_rate == 0 {
            let suffix_array_view: &[I] = bytemuck::cast_slice(&self.suffix_array_bytes);
            return <usize as NumCast>::from(suffix_array_view[idx / self.sampling_rate]);
        }

        if let Some(&border_value) = self.text_border_lookup.get(&idx) {
            return <usize as NumCast>::from(border_value);
        }

        None
    }

    /// Like [`recover_range`](Self::recover_range) for a single position, but starting
    /// the LF-walk with `depth` steps already accounted for. Used by
    /// [`crate::locate_tree::LocateFMTree`] once it gives up splitting a subtree
    /// further and falls back to a plain per-position walk.
    pub(crate) fn recover_one_from_depth(
        &self,
        mut idx: usize,
        depth: usize,
        index: &impl LfMappingSource,
    ) -> usize {
        let mut num_steps_done = depth;

        loop {
            if let Some(value) = self.try_resolve(idx) {
                return value + num_steps_done;
            }

            let bwt_symbol = index.bwt_symbol_at(idx);
            idx = index.lf_mapping_step(bwt_symbol, idx);
            num_steps_done += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FmIndexConfig, alphabet};

    struct TestSource<'a>(&'a crate::FmIndex<i32>);

    impl LfMappingSource for TestSource<'_> {
        fn bwt_symbol_at(&self, idx: usize) -> u8 {
            self.0.bwt_symbol_at(idx)
        }

        fn lf_mapping_step(&self, symbol: u8, idx: usize) -> usize {
            self.0.lf_mapping_step(symbol, idx)
        }
    }

    fn copied_and_recovered_array_must_equal<T: AsRef<[u8]>>(texts: &[T], sampling_rate: usize) {
        let n: usize = texts.iter().map(|t| t.as_ref().len() + 1).sum();
        let alph = alphabet::ascii_dna_with_n();

        let sampled_index = FmIndexConfig::<i32>::new()
            .suffix_array_sampling_rate(sampling_rate)
            .construct_index(texts, alph.clone())
            .unwrap();
        let index = FmIndexConfig::<i32>::new()
            .suffix_array_sampling_rate(1)
            .construct_index(texts, alph)
            .unwrap();

        let recovered: Vec<_> = sampled_index
            .suffix_array
            .recover_range(0..n, &TestSource(&sampled_index))
            .collect();
        let copied: Vec<_> = index
            .suffix_array
            .recover_range(0..n, &TestSource(&index))
            .collect();

        assert_eq!(copied, recovered);
    }

    #[test]
    fn walking_over_text_borders() {
        let texts = [
            [65].as_slice(),
            [].as_slice(),
            [78, 84, 78, 78, 84, 78, 78, 84, 78].as_slice(),
        ];

        copied_and_recovered_array_must_equal(&texts, 5);
    }
}
