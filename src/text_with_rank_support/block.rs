//! Block types used internally by the rank-string encodings.
//!
//! This distinction of block types only exists to allow `#[repr(align(64))]` for the
//! 512 bit block, which keeps one block within a single cache line.

use crate::maybe_savefile::MaybeSavefile;

/// The block used internally by data structures of this library.
///
/// Currently, this can either be [`Block64`] or [`Block512`], with [`Block64`] being the
/// default.
///
/// Larger blocks lead to slightly higher running times of operations, but consume less
/// memory, since fewer per-block offset counters are needed. The difference in memory
/// usage depends on the number of dense symbols of the alphabet used. For small
/// alphabets like DNA alphabets, the difference is almost irrelevant, so [`Block64`] is
/// recommended.
pub trait Block: sealed::Sealed + Clone + Copy + Send + Sync + MaybeSavefile + 'static {
    #[doc(hidden)]
    const NUM_BITS: usize;
    #[doc(hidden)]
    const NUM_U64: usize = Self::NUM_BITS / 64;

    #[doc(hidden)]
    fn from_init_store(init_store: u64) -> Self;

    #[doc(hidden)]
    fn zeroes() -> Self {
        Self::from_init_store(0)
    }

    #[doc(hidden)]
    fn as_raw_slice(&self) -> &[u64];
    #[doc(hidden)]
    fn as_raw_mut_slice(&mut self) -> &mut [u64];

    #[doc(hidden)]
    fn negate(&mut self) {
        for store in self.as_raw_mut_slice() {
            *store = !*store;
        }
    }

    #[doc(hidden)]
    fn set_to_self_and(&mut self, other: Self) {
        for (store, other_store) in self.as_raw_mut_slice().iter_mut().zip(other.as_raw_slice()) {
            *store &= other_store;
        }
    }

    #[doc(hidden)]
    fn count_ones(&self) -> usize {
        self.as_raw_slice()
            .iter()
            .map(|&s| s.count_ones() as usize)
            .sum()
    }

    /// Counts the set bits strictly before `index`, then clears the rest of the block.
    /// Kept as one operation because every caller immediately discards the higher bits.
    #[doc(hidden)]
    fn count_ones_before(&self, index: usize) -> usize {
        let store_index = index / 64;
        let index_in_store = index % 64;

        let mut count = 0;

        for &store in &self.as_raw_slice()[..store_index] {
            count += store.count_ones() as usize;
        }

        let mask = (1u64 << index_in_store) - 1;
        let masked = if index_in_store == 0 {
            0
        } else {
            self.as_raw_slice()[store_index] & mask
        };
        count += masked.count_ones() as usize;

        count
    }

    #[doc(hidden)]
    fn zeroize_bits_starting_from(&mut self, index: usize) {
        let store_index = index / 64;
        let index_in_store = index % 64;

        let mask = if index_in_store == 0 {
            0
        } else {
            (1u64 << index_in_store) - 1
        };

        let stores = self.as_raw_mut_slice();
        stores[store_index] &= mask;

        for store in &mut stores[store_index + 1..] {
            *store = 0;
        }
    }

    #[doc(hidden)]
    fn get_bit(&self, index: usize) -> u8 {
        let store_index = index / 64;
        let index_in_store = index % 64;
        ((self.as_raw_slice()[store_index] >> index_in_store) & 1) as u8
    }

    #[doc(hidden)]
    fn set_bit_assuming_zero(&mut self, index: usize, bit: u8) {
        if bit == 0 {
            return;
        }

        let store_index = index / 64;
        let index_in_store = index % 64;
        self.as_raw_mut_slice()[store_index] |= 1u64 << index_in_store;
    }
}

/// Smaller blocks, recommended for alphabets with fewer dense symbols, like DNA
/// alphabets.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[cfg_attr(feature = "mem_dbg", derive(mem_dbg::MemSize, mem_dbg::MemDbg))]
#[derive(Debug, Clone, Copy)]
pub struct Block64 {
    data: u64,
}

impl sealed::Sealed for Block64 {}
impl MaybeSavefile for Block64 {}
impl crate::maybe_mem_dbg::MaybeMemDbg for Block64 {}

impl Block for Block64 {
    const NUM_BITS: usize = 64;

    fn from_init_store(init_store: u64) -> Self {
        Self { data: init_store }
    }

    fn as_raw_slice(&self) -> &[u64] {
        std::slice::from_ref(&self.data)
    }

    fn as_raw_mut_slice(&mut self) -> &mut [u64] {
        std::slice::from_mut(&mut self.data)
    }
}

/// Larger blocks, recommended for alphabets with many dense symbols.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[cfg_attr(feature = "mem_dbg", derive(mem_dbg::MemSize, mem_dbg::MemDbg))]
#[derive(Debug, Clone, Copy)]
#[repr(align(64))]
pub struct Block512 {
    data: [u64; 8],
}

impl sealed::Sealed for Block512 {}
impl MaybeSavefile for Block512 {}
impl crate::maybe_mem_dbg::MaybeMemDbg for Block512 {}

impl Block for Block512 {
    const NUM_BITS: usize = 512;

    fn from_init_store(init_store: u64) -> Self {
        Self {
            data: [init_store; 8],
        }
    }

    fn as_raw_slice(&self) -> &[u64] {
        &self.data
    }

    fn as_raw_mut_slice(&mut self) -> &mut [u64] {
        &mut self.data
    }
}

mod sealed {
    pub trait Sealed {}
}
