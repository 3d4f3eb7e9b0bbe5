//! The simplest rank-string encoding: one prefix-count column per symbol.
//!
//! Uses `O(sigma * n)` memory with no block/superblock hierarchy. Useful as a
//! correctness oracle for the other encodings and for tiny alphabets where memory is
//! not a concern.

use super::TextWithRankSupport;
use crate::maybe_savefile::MaybeSavefile;
use crate::sealed::Sealed;

use num_traits::PrimInt;
use std::marker::PhantomData;

#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug)]
pub struct NaiveTextWithRankSupport<I> {
    columns: Vec<Vec<usize>>,
    text_len: usize,
    alphabet_size: usize,
    _marker: PhantomData<I>,
}

impl<I: PrimInt + Send + Sync + MaybeSavefile + 'static> MaybeSavefile
    for NaiveTextWithRankSupport<I>
{
}
impl<I> Sealed for NaiveTextWithRankSupport<I> {}

impl<I: PrimInt + Send + Sync + MaybeSavefile + 'static> TextWithRankSupport<I>
    for NaiveTextWithRankSupport<I>
{
    fn construct(text: &[u8], alphabet_size: usize) -> Self {
        assert!(alphabet_size >= 2);

        let columns = (0..alphabet_size)
            .map(|symbol| occurrence_column(symbol as u8, text))
            .collect();

        Self {
            columns,
            text_len: text.len(),
            alphabet_size,
            _marker: PhantomData,
        }
    }

    fn rank(&self, symbol: u8, idx: usize) -> usize {
        self.columns[symbol as usize][idx]
    }

    fn symbol_at(&self, idx: usize) -> u8 {
        for (symbol, column) in self.columns.iter().enumerate() {
            if column[idx] < column[idx + 1] {
                return symbol as u8;
            }
        }

        unreachable!("every text position belongs to exactly one symbol")
    }

    fn text_len(&self) -> usize {
        self.text_len
    }

    fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }
}

fn occurrence_column(target_symbol: u8, text: &[u8]) -> Vec<usize> {
    let mut column = Vec::with_capacity(text.len() + 1);
    let mut count = 0;
    column.push(count);

    for &symbol in text {
        if symbol == target_symbol {
            count += 1;
        }
        column.push(count);
    }

    column
}
