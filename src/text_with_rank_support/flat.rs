//! The "flat" rank-string encoding: `ceil(log2 alphabet_size)` bitmasks per block,
//! combined via negate+AND+popcount, same as [`super::CondensedTextWithRankSupport`].
//!
//! Despite the name, this is not a literal one-bitmask-per-symbol layout; it sizes every
//! array by `ilog2_ceil(alphabet_size)` rather than `alphabet_size`, so it is the same EPR
//! family as `condensed.rs`. The two differ only in how a block's final count is produced
//! (`zeroize_bits_starting_from` + `count_ones` here, `count_ones_before` there), which is
//! enough to make this one marginally the faster of the two in practice.
//!
//! Interleaved means that the respective values for different symbols of the alphabet
//! for the same text position are next to each other. Blocks must be interleaved for
//! efficient queries. (Super)block offsets are only interleaved for faster (parallel)
//! construction.

use super::block::{Block, Block64};
use super::{TextWithRankSupport, ilog2_ceil, prefetch_read};
use crate::maybe_mem_dbg::MaybeMemDbg;
use crate::maybe_savefile::MaybeSavefile;
use crate::sealed::Sealed;

use num_traits::{NumCast, PrimInt};
use rayon::prelude::*;

/// The fastest of this crate's rank-string encodings: `ceil(log2 alphabet_size)`
/// bitmasks per block, interleaved per block.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[cfg_attr(feature = "mem_dbg", derive(mem_dbg::MemSize, mem_dbg::MemDbg))]
#[derive(Debug)]
pub struct FlatTextWithRankSupport<I, B = Block64> {
    text_len: usize,
    alphabet_size: usize,
    interleaved_blocks: Vec<B>,
    interleaved_block_offsets: Vec<u16>,
    interleaved_superblock_offsets: Vec<I>,
}

impl<I: PrimInt + Send + Sync + MaybeSavefile + 'static, B: Block> MaybeMemDbg
    for FlatTextWithRankSupport<I, B>
{
}

impl<I: PrimInt + Send + Sync + MaybeSavefile + 'static, B: Block> MaybeSavefile
    for FlatTextWithRankSupport<I, B>
{
}
impl<I, B> Sealed for FlatTextWithRankSupport<I, B> {}

impl<I: PrimInt + Send + Sync + MaybeSavefile + 'static, B: Block> TextWithRankSupport<I>
    for FlatTextWithRankSupport<I, B>
{
    fn construct(text: &[u8], alphabet_size: usize) -> Self {
        assert!(alphabet_size >= 2);

        let alphabet_num_bits = ilog2_ceil(alphabet_size);
        let len: usize = text.len() + 1;
        let superblock_size = u16::MAX as usize + 1;

        let num_indicator_blocks = len.div_ceil(B::NUM_BITS) * alphabet_num_bits;
        let num_block_offsets = len.div_ceil(B::NUM_BITS) * alphabet_size;
        let num_superblock_offsets = len.div_ceil(superblock_size) * alphabet_size;

        let mut interleaved_blocks = vec![B::zeroes(); num_indicator_blocks];
        let mut interleaved_block_offsets = vec![0; num_block_offsets];
        let mut interleaved_superblock_offsets = vec![I::zero(); num_superblock_offsets];

        let num_blocks_per_superblock = (superblock_size / B::NUM_BITS) * alphabet_num_bits;
        let blocks_per_superblock_iter =
            interleaved_blocks.par_chunks_mut(num_blocks_per_superblock);

        let num_block_offsets_per_superblock = (superblock_size / B::NUM_BITS) * alphabet_size;
        let block_offsets_per_superblock_iter =
            interleaved_block_offsets.par_chunks_mut(num_block_offsets_per_superblock);

        let superblock_offsets_iter = interleaved_superblock_offsets.par_chunks_mut(alphabet_size);
        let text_superblock_iter = text.par_chunks(superblock_size);

        (
            text_superblock_iter,
            superblock_offsets_iter,
            block_offsets_per_superblock_iter,
            blocks_per_superblock_iter,
        )
            .into_par_iter()
            .for_each(|(t, so, bo, b)| fill_superblock::<I, B>(t, so, bo, b, alphabet_size));

        let mut temp_offsets = vec![I::zero(); alphabet_size];
        let mut sum_of_previous = vec![I::zero(); alphabet_size];

        for superblock_offsets in interleaved_superblock_offsets.chunks_mut(alphabet_size) {
            temp_offsets.copy_from_slice(superblock_offsets);
            superblock_offsets.copy_from_slice(&sum_of_previous);

            for (sum, temp) in sum_of_previous.iter_mut().zip(&temp_offsets) {
                *sum = *sum + *temp;
            }
        }

        Self {
            text_len: text.len(),
            alphabet_size,
            interleaved_blocks,
            interleaved_block_offsets,
            interleaved_superblock_offsets,
        }
    }

    fn rank(&self, symbol: u8, idx: usize) -> usize {
        assert!((symbol as usize) < self.alphabet_size && idx <= self.text_len);
        unsafe { self.rank_unchecked(symbol, idx) }
    }

    unsafe fn rank_unchecked(&self, mut symbol: u8, idx: usize) -> usize {
        let symbol_usize = symbol as usize;
        let alphabet_num_bits = ilog2_ceil(self.alphabet_size);

        let superblock_size = u16::MAX as usize + 1;
        let superblock_offset_index = (idx / superblock_size) * self.alphabet_size + symbol_usize;
        let superblock_offset = self.interleaved_superblock_offsets[superblock_offset_index];
        let superblock_offset = <usize as NumCast>::from(superblock_offset).unwrap();

        let block_offset_index = (idx / B::NUM_BITS) * self.alphabet_size + symbol_usize;
        let block_offset = self.interleaved_block_offsets[block_offset_index] as usize;

        let blocks_start = (idx / B::NUM_BITS) * alphabet_num_bits;
        let blocks_end = blocks_start + alphabet_num_bits;
        let blocks = &self.interleaved_blocks[blocks_start..blocks_end];

        let mut accumulator = blocks[0];
        if symbol & 1 == 0 {
            accumulator.negate();
        }

        for mut block in blocks[1..].iter().copied() {
            symbol >>= 1;

            if symbol & 1 == 0 {
                block.negate();
            }

            accumulator.set_to_self_and(block);
        }

        let index_in_block = idx % B::NUM_BITS;
        accumulator.zeroize_bits_starting_from(index_in_block);

        superblock_offset + block_offset + accumulator.count_ones()
    }

    fn symbol_at(&self, idx: usize) -> u8 {
        let alphabet_num_bits = ilog2_ceil(self.alphabet_size);
        let blocks_start = (idx / B::NUM_BITS) * alphabet_num_bits;
        let blocks_end = blocks_start + alphabet_num_bits;
        let blocks = &self.interleaved_blocks[blocks_start..blocks_end];

        let index_in_block = idx % B::NUM_BITS;
        let mut symbol = 0;

        for (i, block) in blocks.iter().enumerate() {
            symbol |= block.get_bit(index_in_block) << i;
        }

        symbol
    }

    fn all_ranks(&self, idx: usize) -> Vec<usize> {
        assert!(idx <= self.text_len);

        let alphabet_num_bits = ilog2_ceil(self.alphabet_size);
        let superblock_size = u16::MAX as usize + 1;

        let superblock_offset_base = (idx / superblock_size) * self.alphabet_size;
        let block_offset_base = (idx / B::NUM_BITS) * self.alphabet_size;

        let blocks_start = (idx / B::NUM_BITS) * alphabet_num_bits;
        let blocks_end = blocks_start + alphabet_num_bits;
        let blocks = &self.interleaved_blocks[blocks_start..blocks_end];

        let index_in_block = idx % B::NUM_BITS;
        let mut accumulators = super::bulk_rank_accumulators(blocks, self.alphabet_size);

        accumulators
            .iter_mut()
            .enumerate()
            .map(|(c, acc)| {
                acc.zeroize_bits_starting_from(index_in_block);

                let superblock_offset = self.interleaved_superblock_offsets[superblock_offset_base + c];
                let superblock_offset = <usize as NumCast>::from(superblock_offset).unwrap();
                let block_offset = self.interleaved_block_offsets[block_offset_base + c] as usize;

                superblock_offset + block_offset + acc.count_ones()
            })
            .collect()
    }

    fn text_len(&self) -> usize {
        self.text_len
    }

    fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    fn prefetch(&self, idx: usize) {
        let alphabet_num_bits = ilog2_ceil(self.alphabet_size);
        let blocks_start = (idx / B::NUM_BITS) * alphabet_num_bits;

        if let Some(block) = self.interleaved_blocks.get(blocks_start) {
            prefetch_read(block as *const B);
        }
    }
}

fn fill_superblock<I: PrimInt, B: Block>(
    text: &[u8],
    interleaved_superblock_offsets: &mut [I],
    interleaved_block_offsets: &mut [u16],
    interleaved_blocks: &mut [B],
    alphabet_size: usize,
) {
    let alphabet_num_bits = ilog2_ceil(alphabet_size);
    let mut block_offsets_sum = vec![0u16; alphabet_size];

    let text_block_iter = text.chunks(B::NUM_BITS);
    let block_offsets_iter = interleaved_block_offsets.chunks_mut(alphabet_size);
    let blocks_iter = interleaved_blocks.chunks_mut(alphabet_num_bits);

    let blocks_overshoot = text_block_iter.len() < blocks_iter.len();
    let package_iter = text_block_iter.zip(block_offsets_iter).zip(blocks_iter);

    for ((text_block, block_offsets), blocks) in package_iter {
        block_offsets.copy_from_slice(&block_offsets_sum);

        for (index_in_block, mut symbol) in text_block.iter().copied().enumerate() {
            let symbol_usize = <usize as NumCast>::from(symbol).unwrap();

            let superblock_count = &mut interleaved_superblock_offsets[symbol_usize];
            *superblock_count = *superblock_count + I::one();

            block_offsets_sum[symbol_usize] += 1;

            for block in blocks.iter_mut() {
                block.set_bit_assuming_zero(index_in_block, symbol & 1);
                symbol >>= 1;
            }
        }
    }

    // annoying edge case: the bit array we're storing is text.len() + 1 large
    if blocks_overshoot {
        interleaved_block_offsets
            .rchunks_mut(alphabet_size)
            .next()
            .unwrap()
            .copy_from_slice(&block_offsets_sum);
    }
}
