use crate::{
    Alphabet, BiFmIndex, FmIndex, IndexStorage,
    block::{Block, Block64},
    error,
};
use std::marker::PhantomData;

/// A builder-like API to configure and construct a unidirectional [`FmIndex`].
#[derive(Clone, Copy)]
pub struct FmIndexConfig<I, B = Block64> {
    pub(crate) suffix_array_sampling_rate: usize,
    pub(crate) lookup_table_depth: usize,
    _index_storage_marker: PhantomData<I>,
    _block_marker: PhantomData<B>,
}

impl<I: IndexStorage, B: Block> FmIndexConfig<I, B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every suffix array entry at a position divisible by `suffix_array_sampling_rate`
    /// is retained. A larger rate leads to less memory usage but a higher `locate`
    /// running time. The default is `4`.
    pub fn suffix_array_sampling_rate(self, suffix_array_sampling_rate: usize) -> Self {
        assert!(suffix_array_sampling_rate > 0);

        Self {
            suffix_array_sampling_rate,
            ..self
        }
    }

    /// The index stores a lookup table to skip the first `lookup_table_depth` search
    /// steps. Table size grows exponentially in this depth. The default is `8`.
    pub fn lookup_table_depth(self, lookup_table_depth: usize) -> Self {
        Self {
            lookup_table_depth,
            ..self
        }
    }

    /// Construct the FM-index. The number of construction threads is controlled by
    /// [`rayon`].
    pub fn construct_index<T: AsRef<[u8]>>(
        self,
        texts: impl IntoIterator<Item = T>,
        alphabet: Alphabet,
    ) -> error::Result<FmIndex<I, B>> {
        FmIndex::new(texts, alphabet, self)
    }
}

impl<I: IndexStorage, B: Block> Default for FmIndexConfig<I, B> {
    fn default() -> Self {
        Self {
            suffix_array_sampling_rate: 4,
            lookup_table_depth: 8,
            _index_storage_marker: PhantomData,
            _block_marker: PhantomData,
        }
    }
}

/// A builder-like API to configure and construct a [`BiFmIndex`].
#[derive(Clone, Copy)]
pub struct BiFmIndexConfig<I, B = Block64> {
    pub(crate) suffix_array_sampling_rate: usize,
    pub(crate) lookup_table_depth: usize,
    _index_storage_marker: PhantomData<I>,
    _block_marker: PhantomData<B>,
}

impl<I: IndexStorage, B: Block> BiFmIndexConfig<I, B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suffix_array_sampling_rate(self, suffix_array_sampling_rate: usize) -> Self {
        assert!(suffix_array_sampling_rate > 0);

        Self {
            suffix_array_sampling_rate,
            ..self
        }
    }

    pub fn lookup_table_depth(self, lookup_table_depth: usize) -> Self {
        Self {
            lookup_table_depth,
            ..self
        }
    }

    /// Construct the bidirectional FM-index. Builds both the forward and reverse
    /// occurrence tables in parallel via [`rayon::join`].
    pub fn construct_index<T: AsRef<[u8]>>(
        self,
        texts: impl IntoIterator<Item = T>,
        alphabet: Alphabet,
    ) -> error::Result<BiFmIndex<I, B>> {
        BiFmIndex::new(texts, alphabet, self)
    }
}

impl<I: IndexStorage, B: Block> Default for BiFmIndexConfig<I, B> {
    fn default() -> Self {
        Self {
            suffix_array_sampling_rate: 4,
            lookup_table_depth: 8,
            _index_storage_marker: PhantomData,
            _block_marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_config() {
        let texts = [b"ACGT"];
        let alphabet = crate::alphabet::ascii_dna();

        let _index = FmIndexConfig::<i32>::new()
            .lookup_table_depth(5)
            .suffix_array_sampling_rate(8)
            .construct_index(texts, alphabet)
            .unwrap();
    }

    #[test]
    fn basic_bidirectional_config() {
        let texts = [b"ACGT"];
        let alphabet = crate::alphabet::ascii_dna();

        let _index = BiFmIndexConfig::<i32>::new()
            .lookup_table_depth(3)
            .suffix_array_sampling_rate(2)
            .construct_index(texts, alphabet)
            .unwrap();
    }
}
