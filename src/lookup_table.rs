//! K-mer accelerator: precomputed BWT intervals for the first `depth` symbols of a
//! backward search, letting [`crate::FmIndex::cursor_for_query`] /
//! [`crate::BiFmIndex::cursor_for_query`] skip straight to depth `d` instead of
//! performing `d` individual backward-search steps.

use bytemuck::Pod;
use num_traits::{NumCast, PrimInt};

use crate::block::Block;
use crate::{BiFmIndex, FmIndex, IndexStorage};

#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug)]
pub(crate) struct LookupTables<I: 'static> {
    num_symbols: usize,
    tables: Vec<LookupTable<I>>,
}

impl<I: PrimInt + Pod + 'static> LookupTables<I> {
    pub(crate) fn new_empty() -> Self {
        Self {
            num_symbols: 0,
            tables: Vec::new(),
        }
    }

    pub(crate) fn lookup(&self, query: impl IntoIterator<Item = u8>, depth: usize) -> (usize, usize) {
        self.tables[depth].lookup(query, self.num_symbols)
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.tables.len() - 1
    }
}

pub(crate) fn fill_lookup_tables<I: IndexStorage, B: Block>(
    index: &mut FmIndex<I, B>,
    max_depth: usize,
    num_symbols: usize,
) where
    I::LibsaisOutput: Pod,
{
    index.lookup_tables.num_symbols = num_symbols;

    for depth in 0..=max_depth {
        let table = LookupTable::new(depth, num_symbols, index.total_text_len(), |query| {
            let mut interval = (0usize, index.total_text_len());
            for symbol in query {
                if interval.1 == interval.0 {
                    break;
                }
                interval = (
                    index.lf_mapping_step(symbol, interval.0),
                    index.lf_mapping_step(symbol, interval.1),
                );
            }
            interval
        });
        index.lookup_tables.tables.push(table);
    }
}

pub(crate) fn fill_bidirectional_lookup_tables<I: IndexStorage, B: Block>(
    index: &mut BiFmIndex<I, B>,
    max_depth: usize,
    num_symbols: usize,
) where
    I::LibsaisOutput: Pod,
{
    index.forward_lookup_tables.num_symbols = num_symbols;
    index.reverse_lookup_tables.num_symbols = num_symbols;

    let total_len = index.total_text_len();

    for depth in 0..=max_depth {
        let forward_table = LookupTable::new(depth, num_symbols, total_len, |query| {
            let mut interval = (0usize, total_len);
            for symbol in query {
                if interval.1 == interval.0 {
                    break;
                }
                interval = (
                    index.lf_mapping_step_forward(symbol, interval.0),
                    index.lf_mapping_step_forward(symbol, interval.1),
                );
            }
            interval
        });
        index.forward_lookup_tables.tables.push(forward_table);

        let reverse_table = LookupTable::new(depth, num_symbols, total_len, |query| {
            let mut interval = (0usize, total_len);
            for symbol in query {
                if interval.1 == interval.0 {
                    break;
                }
                interval = (
                    index.lf_mapping_step_reverse(symbol, interval.0),
                    index.lf_mapping_step_reverse(symbol, interval.1),
                );
            }
            interval
        });
        index.reverse_lookup_tables.tables.push(reverse_table);
    }
}

#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug)]
struct LookupTable<I: 'static> {
    data: Vec<(I, I)>,
    depth: usize,
}

impl<I: PrimInt + Pod + 'static> LookupTable<I> {
    fn new(
        depth: usize,
        num_symbols: usize,
        total_len: usize,
        mut search: impl FnMut(std::vec::IntoIter<u8>) -> (usize, usize),
    ) -> Self {
        let num_values = num_symbols.pow(depth as u32);
        let mut data = vec![(I::zero(), I::zero()); num_values];

        if depth == 0 {
            data[0] = (
                <I as NumCast>::from(0).unwrap(),
                <I as NumCast>::from(total_len).unwrap(),
            );
            return Self { data, depth };
        }

        let mut query = vec![0u8; depth];
        fill_table(1, depth, num_symbols, 0, &mut data, &mut query, &mut search);

        Self { data, depth }
    }

    fn lookup(&self, query: impl IntoIterator<Item = u8>, num_symbols: usize) -> (usize, usize) {
        let mut idx = 0;
        let mut exponent = self.depth.saturating_sub(1);

        for symbol in query.into_iter().take(self.depth) {
            // subtract one: the sentinel is never stored in the table
            let symbol = symbol - 1;
            idx += symbol as usize * num_symbols.pow(exponent as u32);
            exponent = exponent.saturating_sub(1);
        }

        let (start, end) = self.data[idx];
        (
            <usize as NumCast>::from(start).unwrap(),
            <usize as NumCast>::from(end).unwrap(),
        )
    }
}

fn fill_table<I: PrimInt + Pod + 'static>(
    curr_depth: usize,
    max_depth: usize,
    num_symbols: usize,
    curr_data_idx: usize,
    data: &mut [(I, I)],
    query: &mut [u8],
    search: &mut impl FnMut(std::vec::IntoIter<u8>) -> (usize, usize),
) {
    if curr_depth == max_depth {
        for symbol in 0..num_symbols {
            query[curr_depth - 1] = symbol as u8 + 1; // +1 to offset sentinel
            let (start, end) = search(query.to_vec().into_iter());
            data[curr_data_idx + symbol] = (
                <I as NumCast>::from(start).unwrap(),
                <I as NumCast>::from(end).unwrap(),
            );
        }
        return;
    }

    for symbol in 0..num_symbols {
        let exponent = max_depth - curr_depth;
        let next_data_index = curr_data_idx + symbol * num_symbols.pow(exponent as u32);
        query[curr_depth - 1] = symbol as u8 + 1;
        fill_table(
            curr_depth + 1,
            max_depth,
            num_symbols,
            next_data_index,
            data,
            query,
            search,
        );
    }
}
