/*! A bidirectional FM-index over compressed, small-alphabet sequence collections, with
 * approximate search driven by search schemes ([original paper]).
 *
 * The index supports exact search via [`BiFmIndex::count`]/[`BiFmIndex::locate`] and the
 * flexible [`BiCursor`] API, and approximate (Hamming / edit / scoring-matrix) search via
 * [`searcher::Searcher`] driven by a [`search_schemes::Scheme`].
 *
 * Index construction is based on the [`libsais`] crate and parallelized with [`rayon`].
 *
 * ## Usage
 *
 * ```
 * use bifmindex::{BiFmIndexConfig, alphabet};
 *
 * let dna_n_alphabet = alphabet::ascii_dna_with_n();
 * let texts = [b"aACGT", b"acGtn"];
 *
 * let index = BiFmIndexConfig::<i32>::new().construct_index(texts, dna_n_alphabet).unwrap();
 *
 * let query = b"GT";
 * assert_eq!(index.count(query), 2);
 *
 * for hit in index.locate(query) {
 *     println!("Found query in text {} at position {}.", hit.text_id, hit.position);
 * }
 * ```
 *
 * ## Safety
 *
 * This library internally contains a small amount of `unsafe`, used to remove bounds
 * checks from the hot `rank` path of [`TextWithRankSupport`] for a performance benefit.
 *
 * [original paper]: https://doi.org/10.1109/SFCS.2000.892127
 */

pub mod alphabet;
mod config;
mod cursor;
pub mod error;
pub mod locate_tree;
mod lookup_table;
pub mod search_schemes;
pub mod searcher;
mod sampled_suffix_array;
mod text_id_search_tree;
pub mod text_with_rank_support;

mod construction;

use bytemuck::Pod;
use libsais::OutputElement;
use num_traits::PrimInt;

#[doc(inline)]
pub use alphabet::Alphabet;
#[doc(inline)]
pub use config::{BiFmIndexConfig, FmIndexConfig};
#[doc(inline)]
pub use cursor::{BiCursor, Cursor};
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use text_with_rank_support::TextWithRankSupport;
#[doc(inline)]
pub use text_with_rank_support::block;

use block::{Block, Block64};

use construction::DataStructures;
use lookup_table::LookupTables;
use sampled_suffix_array::{LfMappingSource, SampledSuffixArray};
use text_id_search_tree::TextIdSearchTree;

/// The unidirectional FM-index data structure. Supports a forward-only [`Cursor`] API
/// and is used internally, one per direction, by [`BiFmIndex`].
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
pub struct FmIndex<I, B = Block64> {
    alphabet: Alphabet,
    count: Vec<usize>,
    text_with_rank_support: text_with_rank_support::FlatTextWithRankSupport<I, B>,
    suffix_array: SampledSuffixArray<I>,
    text_ids: TextIdSearchTree,
    lookup_tables: LookupTables<I>,
}

impl<I: IndexStorage, B: Block> FmIndex<I, B> {
    fn new<T: AsRef<[u8]>>(
        texts: impl IntoIterator<Item = T>,
        alphabet: Alphabet,
        config: FmIndexConfig<I, B>,
    ) -> error::Result<Self> {
        let DataStructures {
            count,
            sampled_suffix_array,
            text_ids,
            text_with_rank_support,
        } = construction::create_data_structures::<I, _, T>(texts, &config, &alphabet)?;

        let num_searchable_dense_symbols = alphabet.num_searchable_dense_symbols();

        let mut index = FmIndex {
            alphabet,
            count,
            text_with_rank_support,
            suffix_array: sampled_suffix_array,
            text_ids,
            lookup_tables: LookupTables::new_empty(),
        };

        unsafe {
            lookup_table::fill_lookup_tables(
                &mut index,
                config.lookup_table_depth,
                num_searchable_dense_symbols,
            );
        }

        Ok(index)
    }

    /// Returns the number of occurrences of `query` in the set of indexed texts.
    pub fn count(&self, query: &[u8]) -> usize {
        self.cursor_for_query(query).count()
    }

    /// Returns an iterator over all occurrences of `query`.
    pub fn locate(&self, query: &[u8]) -> impl Iterator<Item = Hit> {
        let cursor = self.cursor_for_query(query);
        unsafe { self.locate_interval(cursor.interval()) }
    }

    // SAFETY precondition: the interval must be a valid range for the text
    unsafe fn locate_interval(&self, interval: HalfOpenInterval) -> impl Iterator<Item = Hit> {
        self.suffix_array
            .recover_range(interval.start..interval.end, self)
            .map(|idx| {
                let (text_id, position) =
                    self.text_ids.backtransform_concatenated_text_index(idx);

                Hit { text_id, position }
            })
    }

    pub fn cursor_empty(&self) -> Cursor<'_, I, B> {
        Cursor {
            index: self,
            interval: HalfOpenInterval {
                start: 0,
                end: self.total_text_len(),
            },
        }
    }

    pub fn cursor_for_query(&self, query: &[u8]) -> Cursor<'_, I, B> {
        let query_iter = query
            .iter()
            .rev()
            .map(|&s| self.alphabet.io_to_dense_representation(s));

        unsafe { self.cursor_for_iter_without_alphabet_translation(query_iter) }
    }

    // SAFETY precondition: symbols must be valid in dense representation for the alphabet
    unsafe fn cursor_for_iter_without_alphabet_translation<Q>(
        &self,
        query: impl IntoIterator<IntoIter = Q>,
    ) -> Cursor<'_, I, B>
    where
        Q: ExactSizeIterator<Item = u8>,
    {
        let mut query_iter = query.into_iter();

        let lookup_depth = std::cmp::min(query_iter.len(), self.lookup_tables.max_depth());
        let (start, end) = self.lookup_tables.lookup(&mut query_iter, lookup_depth);

        let mut cursor = Cursor {
            index: self,
            interval: HalfOpenInterval { start, end },
        };

        for symbol in query_iter {
            cursor.extend_front_without_alphabet_translation(symbol);

            if cursor.count() == 0 {
                break;
            }
        }

        cursor
    }

    fn lf_mapping_step(&self, symbol: u8, idx: usize) -> usize {
        self.count[symbol as usize] + self.text_with_rank_support.rank(symbol, idx)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn num_texts(&self) -> usize {
        self.text_ids.sentinel_indices.len()
    }

    pub fn total_text_len(&self) -> usize {
        self.text_with_rank_support.text_len()
    }
}

impl<I: IndexStorage, B: Block> LfMappingSource for FmIndex<I, B> {
    fn bwt_symbol_at(&self, idx: usize) -> u8 {
        self.text_with_rank_support.symbol_at(idx)
    }

    fn lf_mapping_step(&self, symbol: u8, idx: usize) -> usize {
        self.lf_mapping_step(symbol, idx)
    }
}

/// The bidirectional FM-index data structure.
///
/// Internally owns two occurrence tables, one over the concatenated texts and one over
/// their per-sequence reversal, sharing a single compressed suffix array, symbol count
/// table and text-id lookup structure. Use [`cursor_empty`](Self::cursor_empty) /
/// [`cursor_for_query`](Self::cursor_for_query) to obtain a [`BiCursor`] that can be
/// extended on either side, or [`searcher::Searcher`] for approximate search.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
pub struct BiFmIndex<I, B = Block64> {
    alphabet: Alphabet,
    count: Vec<usize>,
    forward_rank: text_with_rank_support::FlatTextWithRankSupport<I, B>,
    reverse_rank: text_with_rank_support::FlatTextWithRankSupport<I, B>,
    suffix_array: SampledSuffixArray<I>,
    text_ids: TextIdSearchTree,
    forward_lookup_tables: LookupTables<I>,
    reverse_lookup_tables: LookupTables<I>,
}

impl<I: IndexStorage, B: Block> BiFmIndex<I, B> {
    fn new<T: AsRef<[u8]>>(
        texts: impl IntoIterator<Item = T>,
        alphabet: Alphabet,
        config: BiFmIndexConfig<I, B>,
    ) -> error::Result<Self> {
        construction::create_bidirectional_data_structures(texts, &config, alphabet)
    }

    pub fn count(&self, query: &[u8]) -> usize {
        self.cursor_for_query(query).count()
    }

    pub fn locate(&self, query: &[u8]) -> impl Iterator<Item = Hit> {
        let cursor = self.cursor_for_query(query);
        unsafe { self.locate_interval(cursor.forward_interval()) }
    }

    // SAFETY precondition: the interval must be a valid range for the forward text
    pub(crate) unsafe fn locate_interval(
        &self,
        interval: HalfOpenInterval,
    ) -> impl Iterator<Item = Hit> {
        self.suffix_array
            .recover_range(interval.start..interval.end, self)
            .map(|idx| {
                let (text_id, position) =
                    self.text_ids.backtransform_concatenated_text_index(idx);

                Hit { text_id, position }
            })
    }

    pub(crate) fn recover_one(&self, forward_idx: usize) -> Hit {
        let idx = self.suffix_array.recover_one(forward_idx, self);
        let (text_id, position) = self.text_ids.backtransform_concatenated_text_index(idx);
        Hit { text_id, position }
    }

    pub fn cursor_empty(&self) -> BiCursor<'_, I, B> {
        BiCursor {
            index: self,
            forward: HalfOpenInterval {
                start: 0,
                end: self.total_text_len(),
            },
            reverse: HalfOpenInterval {
                start: 0,
                end: self.total_text_len(),
            },
        }
    }

    /// Returns a cursor with `query` already searched, extending right-to-left using
    /// the forward lookup table, matching the single-direction [`FmIndex`] convention.
    pub fn cursor_for_query(&self, query: &[u8]) -> BiCursor<'_, I, B> {
        let mut cursor = self.cursor_empty();

        for &byte in query.iter().rev() {
            let symbol = self.alphabet.io_to_dense_representation(byte);
            cursor.extend_left_dense(symbol);

            if cursor.count() == 0 {
                break;
            }
        }

        cursor
    }

    fn lf_mapping_step_forward(&self, symbol: u8, idx: usize) -> usize {
        self.count[symbol as usize] + self.forward_rank.rank(symbol, idx)
    }

    fn lf_mapping_step_reverse(&self, symbol: u8, idx: usize) -> usize {
        self.count[symbol as usize] + self.reverse_rank.rank(symbol, idx)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn num_texts(&self) -> usize {
        self.text_ids.sentinel_indices.len()
    }

    pub fn total_text_len(&self) -> usize {
        self.forward_rank.text_len()
    }
}

impl<I: IndexStorage, B: Block> LfMappingSource for BiFmIndex<I, B> {
    fn bwt_symbol_at(&self, idx: usize) -> u8 {
        self.forward_rank.symbol_at(idx)
    }

    fn lf_mapping_step(&self, symbol: u8, idx: usize) -> usize {
        self.lf_mapping_step_forward(symbol, idx)
    }
}

#[cfg(feature = "savefile")]
impl<I: IndexStorage, B: Block> BiFmIndex<I, B> {
    const VERSION_FOR_SAVEFILE: u32 = 0;

    pub fn load_from_reader(reader: &mut impl std::io::Read) -> error::Result<Self> {
        Ok(savefile::load(reader, Self::VERSION_FOR_SAVEFILE)?)
    }

    pub fn load_from_file(filepath: impl AsRef<std::path::Path>) -> error::Result<Self> {
        Ok(savefile::load_file(filepath, Self::VERSION_FOR_SAVEFILE)?)
    }

    pub fn save_to_writer(&self, writer: &mut impl std::io::Write) -> error::Result<()> {
        Ok(savefile::save(writer, Self::VERSION_FOR_SAVEFILE, self)?)
    }

    pub fn save_to_file(&self, filepath: impl AsRef<std::path::Path>) -> error::Result<()> {
        Ok(savefile::save_file(filepath, Self::VERSION_FOR_SAVEFILE, self)?)
    }
}

/// Represents an occurrence of a searched query in the set of indexed texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hit {
    pub text_id: usize,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HalfOpenInterval {
    pub start: usize,
    pub end: usize,
}

impl HalfOpenInterval {
    pub(crate) fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Types that can be used to store indices inside the FM-index.
///
/// The maximum value of the type is an upper bound for the sum of lengths of indexed
/// texts (including one sentinel per text). Larger types allow indexing larger texts at
/// the cost of memory, especially during construction.
pub trait IndexStorage:
    PrimInt + Pod + maybe_savefile::MaybeSavefile + sealed::Sealed + Send + Sync + 'static
{
    #[doc(hidden)]
    type LibsaisOutput: OutputElement;

    #[doc(hidden)]
    fn sample_suffix_array(
        suffix_array_bytes: Vec<u8>,
        sampling_rate: usize,
        text_border_lookup: std::collections::HashMap<usize, Self>,
    ) -> SampledSuffixArray<Self>;
}

impl sealed::Sealed for i32 {}
impl IndexStorage for i32 {
    type LibsaisOutput = i32;

    fn sample_suffix_array(
        suffix_array_bytes: Vec<u8>,
        sampling_rate: usize,
        text_border_lookup: std::collections::HashMap<usize, Self>,
    ) -> SampledSuffixArray<Self> {
        SampledSuffixArray::new_uncompressed(suffix_array_bytes, sampling_rate, text_border_lookup)
    }
}

impl sealed::Sealed for u32 {}
impl IndexStorage for u32 {
    type LibsaisOutput = i64;

    fn sample_suffix_array(
        suffix_array_bytes: Vec<u8>,
        sampling_rate: usize,
        text_border_lookup: std::collections::HashMap<usize, Self>,
    ) -> SampledSuffixArray<Self> {
        SampledSuffixArray::new_u32_compressed(suffix_array_bytes, sampling_rate, text_border_lookup)
    }
}

impl sealed::Sealed for i64 {}
impl IndexStorage for i64 {
    type LibsaisOutput = i64;

    fn sample_suffix_array(
        suffix_array_bytes: Vec<u8>,
        sampling_rate: usize,
        text_border_lookup: std::collections::HashMap<usize, Self>,
    ) -> SampledSuffixArray<Self> {
        SampledSuffixArray::new_uncompressed(suffix_array_bytes, sampling_rate, text_border_lookup)
    }
}

pub(crate) mod maybe_savefile {
    #[cfg(feature = "savefile")]
    pub trait MaybeSavefile: savefile::Savefile {}

    #[cfg(not(feature = "savefile"))]
    pub trait MaybeSavefile {}

    impl MaybeSavefile for i32 {}
    impl MaybeSavefile for u32 {}
    impl MaybeSavefile for i64 {}
}

pub(crate) mod maybe_mem_dbg {
    #[cfg(feature = "mem_dbg")]
    pub trait MaybeMemDbg: mem_dbg::MemDbg + mem_dbg::MemSize {}

    #[cfg(not(feature = "mem_dbg"))]
    pub trait MaybeMemDbg {}
}

pub(crate) mod sealed {
    pub trait Sealed {}
}
