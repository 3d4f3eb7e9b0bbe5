mod bwt;

use bytemuck::Pod;
use libsais::{OutputElement, ThreadCount};
use num_traits::NumCast;
use rayon::prelude::*;

use crate::block::Block;
use crate::error::{Error, Result};
use crate::sampled_suffix_array::SampledSuffixArray;
use crate::text_id_search_tree::TextIdSearchTree;
use crate::text_with_rank_support::{FlatTextWithRankSupport, TextWithRankSupport};
use crate::{Alphabet, BiFmIndex, BiFmIndexConfig, FmIndexConfig, IndexStorage};

pub(crate) struct DataStructures<I, B> {
    pub(crate) count: Vec<usize>,
    pub(crate) sampled_suffix_array: SampledSuffixArray<I>,
    pub(crate) text_ids: TextIdSearchTree,
    pub(crate) text_with_rank_support: FlatTextWithRankSupport<I, B>,
}

pub(crate) fn create_data_structures<I: IndexStorage, B: Block, T: AsRef<[u8]>>(
    texts: impl IntoIterator<Item = T>,
    config: &FmIndexConfig<I, B>,
    alphabet: &Alphabet,
) -> Result<DataStructures<I, B>>
where
    I::LibsaisOutput: Pod,
{
    let (mut text, mut frequency_table, sentinel_indices) =
        create_concatenated_densely_encoded_text::<I::LibsaisOutput, T>(texts, alphabet)?;

    assert!(text.len() <= <usize as NumCast>::from(I::max_value()).unwrap());

    let text_ids = TextIdSearchTree::new_from_sentinel_indices(sentinel_indices);
    let count = frequency_table_to_count(&frequency_table, alphabet.num_dense_symbols());

    let suffix_array_bytes = construct_libsais_suffix_array::<I>(&text, &mut frequency_table);
    let suffix_array_view: &[I::LibsaisOutput] = bytemuck::cast_slice(&suffix_array_bytes);

    let mut bwt = vec![0u8; text.len()];
    let text_border_lookup =
        bwt::bwt_from_suffix_array::<I::LibsaisOutput, I>(suffix_array_view, &text, &mut bwt, text.len());

    let sampled_suffix_array =
        I::sample_suffix_array(suffix_array_bytes, config.suffix_array_sampling_rate, text_border_lookup);

    let text_with_rank_support =
        FlatTextWithRankSupport::<I, B>::construct(&bwt, alphabet.num_dense_symbols());

    text.clear();

    Ok(DataStructures {
        count,
        sampled_suffix_array,
        text_ids,
        text_with_rank_support,
    })
}

pub(crate) fn create_bidirectional_data_structures<I: IndexStorage, B: Block, T: AsRef<[u8]>>(
    texts: impl IntoIterator<Item = T>,
    config: &BiFmIndexConfig<I, B>,
    alphabet: Alphabet,
) -> Result<BiFmIndex<I, B>>
where
    I::LibsaisOutput: Pod,
{
    let generic_texts: Vec<T> = texts.into_iter().collect();
    let byte_texts: Vec<&[u8]> = generic_texts.iter().map(|t| t.as_ref()).collect();

    if byte_texts.is_empty() {
        return Err(Error::EmptyInput);
    }

    let (mut forward_text, mut forward_frequency_table, sentinel_indices) =
        create_concatenated_densely_encoded_text::<I::LibsaisOutput, &[u8]>(
            byte_texts.iter().copied(),
            &alphabet,
        )?;

    assert!(forward_text.len() <= <usize as NumCast>::from(I::max_value()).unwrap());

    let reversed_byte_texts: Vec<Vec<u8>> = byte_texts
        .iter()
        .map(|t| t.iter().rev().copied().collect())
        .collect();
    let (mut reverse_text, mut reverse_frequency_table, _) =
        create_concatenated_densely_encoded_text::<I::LibsaisOutput, &[u8]>(
            reversed_byte_texts.iter().map(|t| t.as_slice()),
            &alphabet,
        )?;

    let text_ids = TextIdSearchTree::new_from_sentinel_indices(sentinel_indices);
    let count = frequency_table_to_count(&forward_frequency_table, alphabet.num_dense_symbols());

    let ((sampled_suffix_array, forward_rank), reverse_rank) = rayon::join(
        || {
            let suffix_array_bytes =
                construct_libsais_suffix_array::<I>(&forward_text, &mut forward_frequency_table);
            let suffix_array_view: &[I::LibsaisOutput] = bytemuck::cast_slice(&suffix_array_bytes);

            let mut bwt = vec![0u8; forward_text.len()];
            let text_border_lookup = bwt::bwt_from_suffix_array::<I::LibsaisOutput, I>(
                suffix_array_view,
                &forward_text,
                &mut bwt,
                forward_text.len(),
            );

            let sampled_suffix_array = I::sample_suffix_array(
                suffix_array_bytes,
                config.suffix_array_sampling_rate,
                text_border_lookup,
            );

            let rank = FlatTextWithRankSupport::<I, B>::construct(&bwt, alphabet.num_dense_symbols());

            (sampled_suffix_array, rank)
        },
        || {
            let suffix_array_bytes =
                construct_libsais_suffix_array::<I>(&reverse_text, &mut reverse_frequency_table);
            let suffix_array_view: &[I::LibsaisOutput] = bytemuck::cast_slice(&suffix_array_bytes);

            let mut bwt = vec![0u8; reverse_text.len()];
            // the reverse index never locates, so the text border lookup is discarded
            let _: std::collections::HashMap<usize, I> = bwt::bwt_from_suffix_array(
                suffix_array_view,
                &reverse_text,
                &mut bwt,
                reverse_text.len(),
            );

            FlatTextWithRankSupport::<I, B>::construct(&bwt, alphabet.num_dense_symbols())
        },
    );

    forward_text.clear();
    reverse_text.clear();

    let num_searchable_dense_symbols = alphabet.num_searchable_dense_symbols();

    let mut index = BiFmIndex {
        alphabet,
        count,
        forward_rank,
        reverse_rank,
        suffix_array: sampled_suffix_array,
        text_ids,
        forward_lookup_tables: crate::lookup_table::LookupTables::new_empty(),
        reverse_lookup_tables: crate::lookup_table::LookupTables::new_empty(),
    };

    unsafe {
        crate::lookup_table::fill_bidirectional_lookup_tables(
            &mut index,
            config.lookup_table_depth,
            num_searchable_dense_symbols,
        );
    }

    Ok(index)
}

fn construct_libsais_suffix_array<I: IndexStorage>(
    text: &[u8],
    frequency_table: &mut [I::LibsaisOutput],
) -> Vec<u8>
where
    I::LibsaisOutput: Pod,
{
    let mut suffix_array_bytes = vec![0u8; text.len() * size_of::<I::LibsaisOutput>()];
    let suffix_array_buffer: &mut [I::LibsaisOutput] = bytemuck::cast_slice_mut(&mut suffix_array_bytes);

    let mut construction = libsais::SuffixArrayConstruction::for_text(text)
        .in_borrowed_buffer(suffix_array_buffer)
        .multi_threaded(ThreadCount::fixed(
            rayon::current_num_threads()
                .try_into()
                .expect("thread count should fit into u16"),
        ));

    unsafe {
        construction = construction.with_frequency_table(frequency_table);
    }

    construction.run().expect("libsais suffix array construction");

    suffix_array_bytes
}

/// Builds the concatenated, densely-encoded, sentinel-separated text used internally,
/// together with a frequency table over dense symbols and the index of each text's
/// sentinel within the concatenation.
fn create_concatenated_densely_encoded_text<I: OutputElement, T: AsRef<[u8]>>(
    texts: impl IntoIterator<Item = T>,
    alphabet: &Alphabet,
) -> Result<(Vec<u8>, Vec<I>, Vec<usize>)> {
    let generic_texts: Vec<_> = texts.into_iter().collect();
    let texts: Vec<&[u8]> = generic_texts.iter().map(|t| t.as_ref()).collect();
    let num_texts = texts.len();

    if num_texts == 0 {
        return Err(Error::EmptyInput);
    }

    let needed_capacity = texts.iter().map(|t| t.len()).sum::<usize>() + num_texts;

    let sentinel_indices: Vec<_> = texts
        .iter()
        .scan(0, |state, t| {
            let temp = *state + t.len();
            *state += t.len() + 1;
            Some(temp)
        })
        .collect();

    let mut concatenated_text = vec![0u8; needed_capacity];
    let mut concatenated_text_splits = Vec::with_capacity(num_texts);
    let mut remaining_slice = concatenated_text.as_mut_slice();

    for t in texts.iter() {
        let (this, remaining) = remaining_slice.split_at_mut(t.len() + 1);
        concatenated_text_splits.push(this);
        remaining_slice = remaining;
    }

    for ((text_index, text), concatenated_text_split) in
        texts.iter().enumerate().zip(concatenated_text_splits.iter_mut())
    {
        for (position, (&source, target)) in
            text.iter().zip(concatenated_text_split.iter_mut()).enumerate()
        {
            *target = alphabet
                .io_to_dense_representation_checked(source)
                .ok_or(Error::SymbolOutOfAlphabet {
                    byte: source,
                    text_index,
                    position,
                })?;
        }
    }

    let mut frequency_table = vec![I::zero(); 256];
    for &byte in concatenated_text.iter() {
        frequency_table[byte as usize] = frequency_table[byte as usize] + I::one();
    }
    frequency_table[0] = <I as NumCast>::from(num_texts).unwrap();

    Ok((concatenated_text, frequency_table, sentinel_indices))
}

fn frequency_table_to_count<I: OutputElement>(frequency_table: &[I], alphabet_size: usize) -> Vec<usize> {
    let mut count: Vec<_> = frequency_table[..alphabet_size]
        .iter()
        .map(|&value| <usize as NumCast>::from(value).unwrap())
        .collect();

    let mut sum = 0;
    for entry in count.iter_mut() {
        let temp = *entry;
        *entry = sum;
        sum += temp;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet;

    #[test]
    fn concat_text() {
        let texts = [b"cccaaagggttt".as_slice(), b"acgtacgtacgt"];
        let alph = alphabet::ascii_dna();
        let (text, frequency_table, sentinel_indices) =
            create_concatenated_densely_encoded_text::<i32, _>(texts, &alph).unwrap();

        assert_eq!(
            text,
            [2, 2, 2, 1, 1, 1, 3, 3, 3, 4, 4, 4, 0, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4, 0]
        );
        assert_eq!(&sentinel_indices, &[12, 25]);

        let mut expected_frequency_table = vec![0; 256];
        expected_frequency_table[0] = 2;
        expected_frequency_table[1] = 6;
        expected_frequency_table[2] = 6;
        expected_frequency_table[3] = 6;
        expected_frequency_table[4] = 6;
        assert_eq!(expected_frequency_table, frequency_table);
    }

    #[test]
    fn rejects_symbol_outside_alphabet() {
        let texts = [b"ACGTX".as_slice()];
        let alph = alphabet::ascii_dna();

        let result = create_concatenated_densely_encoded_text::<i32, _>(texts, &alph);
        assert!(matches!(result, Err(Error::SymbolOutOfAlphabet { .. })));
    }
}
