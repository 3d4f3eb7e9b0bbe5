use crate::IndexStorage;
use num_traits::NumCast;
use rayon::prelude::*;
use std::collections::HashMap;

/// Derives the Burrows-Wheeler transform of `text` from its already-constructed suffix
/// array, writing it into `bwt` (same length as `text`). Also collects, for every BWT
/// position whose preceding suffix array entry is `0` (a text border), the original
/// suffix array value, needed later to terminate [`crate::sampled_suffix_array`]'s
/// LF-mapping walk.
///
/// Collecting the text border lookup while constructing the BWT in one pass is
/// noticeably faster than a single flat chunking scheme; the two-level chunk split
/// below reproduces that performance without changing the result.
pub(crate) fn bwt_from_suffix_array<I1: IndexStorage, I2: IndexStorage>(
    suffix_array: &[I1],
    text: &[u8],
    bwt: &mut [u8],
    uncompressed_text_len: usize,
) -> HashMap<usize, I2> {
    let outer_chunk_size = std::cmp::max(text.len().div_ceil(rayon::current_num_threads() * 4), 2);
    let inner_chunk_size = 128;

    suffix_array
        .par_chunks(outer_chunk_size)
        .zip(bwt.par_chunks_mut(outer_chunk_size))
        .enumerate()
        .map(|(outer_chunk_idx, (outer_sa_chunk, outer_bwt_chunk))| {
            let mut text_border_lookup = HashMap::new();

            for (inner_chunk_idx, (inner_sa_chunk, inner_bwt_chunk)) in outer_sa_chunk
                .chunks(inner_chunk_size)
                .zip(outer_bwt_chunk.chunks_mut(inner_chunk_size))
                .enumerate()
            {
                for (i, &text_idx) in inner_sa_chunk.iter().enumerate() {
                    let text_index_usize = <usize as NumCast>::from(text_idx).unwrap();

                    let text_index_usize = if text_index_usize > 0 {
                        text_index_usize
                    } else {
                        uncompressed_text_len
                    };

                    inner_bwt_chunk[i] = text[text_index_usize - 1];
                }

                for (i, &value) in inner_bwt_chunk.iter().enumerate() {
                    if value == 0 {
                        let suffix_array_index =
                            outer_chunk_size * outer_chunk_idx + inner_chunk_size * inner_chunk_idx + i;
                        let text_index = <I2 as NumCast>::from(inner_sa_chunk[i]).unwrap();
                        text_border_lookup.insert(suffix_array_index, text_index);
                    }
                }
            }

            text_border_lookup
        })
        .reduce_with(|mut m0, m1| {
            m0.extend(m1);
            m0
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn correctness_random_texts(text in prop::collection::vec(0u8..5, 0..1500)) {
            let suffix_array: Vec<i32> = libsais::SuffixArrayConstruction::for_text(&text)
                .in_owned_buffer32()
                .single_threaded()
                .run()
                .unwrap()
                .into_vec();

            let mut bwt = vec![0u8; text.len()];
            let lookup: HashMap<usize, i32> =
                bwt_from_suffix_array(&suffix_array, &text, &mut bwt, text.len());

            for (&sa_idx, &text_idx) in &lookup {
                assert_eq!(suffix_array[sa_idx], text_idx);
            }
        }
    }
}
