//! The backtracking searcher: executes a [`Scheme`] against a [`BiFmIndex`] under a
//! [`Distance`] model, driving a [`BiCursor`] one scheme piece at a time.
//!
//! Grounded on the bidirectional backward-search update in [`crate::cursor`]: every
//! step of a search picks a direction (left or right of the piece range matched so
//! far, exactly as [`crate::search_schemes::expand`] assigns it) and extends the cursor
//! with every dense symbol consistent with the step's error budget, recursing with an
//! explicit call stack rather than building the whole search tree up front.

pub mod distance;

pub use distance::{Distance, ScoringMatrix};

use std::collections::HashMap;

use crate::block::Block;
use crate::cursor::BiCursor;
use crate::error::{Error, Result};
use crate::search_schemes::{Scheme, Search};
use crate::{BiFmIndex, Hit, IndexStorage};

/// One occurrence of a query reported by [`Searcher::search_collect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub query_index: usize,
    pub hit: Hit,
    pub errors: usize,
}

/// Drives approximate search of a batch of queries against a [`BiFmIndex`] under a
/// [`Scheme`] and [`Distance`].
pub struct Searcher<'a, I, B> {
    index: &'a BiFmIndex<I, B>,
}

impl<'a, I: IndexStorage, B: Block> Searcher<'a, I, B> {
    pub fn new(index: &'a BiFmIndex<I, B>) -> Self {
        Self { index }
    }

    /// Runs `scheme` (already [`expand`](crate::search_schemes::expand)ed to each
    /// query's length) against every query, invoking `callback(query_index, cursor,
    /// errors)` once per occurrence-subtree found; `cursor`'s range may contain more
    /// than one occurrence, enumerate it with [`BiCursor::locate`] (or
    /// [`BiFmIndex::locate_tree`]) to get individual hits. Each search in the scheme
    /// runs to exhaustion; there is no cancellation.
    pub fn search(
        &self,
        queries: &[&[u8]],
        scheme: &Scheme,
        distance: &Distance,
        mut callback: impl FnMut(usize, &BiCursor<'_, I, B>, usize),
    ) -> Result<()> {
        for (query_index, &query) in queries.iter().enumerate() {
            let dense_query = self.translate_query(query)?;
            scheme.validate_pattern_length(dense_query.len())?;

            for search in &scheme.searches {
                self.run_search(query_index, &dense_query, search, distance, &mut callback);
            }
        }

        Ok(())
    }

    /// Convenience wrapper over [`search`](Self::search) that enumerates every
    /// reported cursor's occurrences and deduplicates by `(query_index, hit)`, keeping
    /// the lowest error count seen for each — edit-distance search can otherwise
    /// report the same occurrence through more than one alignment.
    pub fn search_collect(
        &self,
        queries: &[&[u8]],
        scheme: &Scheme,
        distance: &Distance,
    ) -> Result<Vec<Match>> {
        let mut best: HashMap<(usize, Hit), usize> = HashMap::new();

        self.search(queries, scheme, distance, |query_index, cursor, errors| {
            for hit in cursor.locate() {
                best.entry((query_index, hit))
                    .and_modify(|existing| *existing = (*existing).min(errors))
                    .or_insert(errors);
            }
        })?;

        Ok(best
            .into_iter()
            .map(|((query_index, hit), errors)| Match {
                query_index,
                hit,
                errors,
            })
            .collect())
    }

    fn translate_query(&self, query: &[u8]) -> Result<Vec<u8>> {
        query
            .iter()
            .enumerate()
            .map(|(position, &byte)| {
                self.index
                    .alphabet()
                    .io_to_dense_representation_checked(byte)
                    .ok_or(Error::SymbolOutOfAlphabet {
                        byte,
                        text_index: 0,
                        position,
                    })
            })
            .collect()
    }

    fn run_search(
        &self,
        query_index: usize,
        query: &[u8],
        search: &Search,
        distance: &Distance,
        callback: &mut impl FnMut(usize, &BiCursor<'_, I, B>, usize),
    ) {
        let cursor = self.index.cursor_empty();
        let num_symbols = self.index.alphabet().num_searchable_dense_symbols() as u8;

        match distance {
            Distance::Edit => self.recurse_edit(
                query_index,
                query,
                search,
                num_symbols,
                cursor,
                0,
                0,
                0,
                0,
                callback,
            ),
            _ => self.recurse_substitution(
                query_index,
                query,
                search,
                distance,
                num_symbols,
                cursor,
                0,
                0,
                0,
                0,
                callback,
            ),
        }
    }

    /// Hamming and scoring-matrix search: one substitution per step, no insertions or
    /// deletions, so the query piece consumed and the cursor extension always happen
    /// together.
    #[allow(clippy::too_many_arguments)]
    fn recurse_substitution(
        &self,
        query_index: usize,
        query: &[u8],
        search: &Search,
        distance: &Distance,
        num_symbols: u8,
        cursor: BiCursor<'_, I, B>,
        step: usize,
        errors: usize,
        lo_seen: usize,
        hi_seen: usize,
        callback: &mut impl FnMut(usize, &BiCursor<'_, I, B>, usize),
    ) {
        if step == search.pi.len() {
            callback(query_index, &cursor, errors);
            return;
        }

        let lower = search.lower[step];
        let upper = search.upper[step];

        if errors > upper {
            return;
        }

        let piece = search.pi[step];
        let required = query[piece];
        let direction_right = step == 0 || piece == hi_seen + 1;

        let (next_lo, next_hi) = if step == 0 {
            (piece, piece)
        } else if direction_right {
            (lo_seen, piece)
        } else {
            (piece, hi_seen)
        };

        for symbol in 1..=num_symbols {
            let cost = match distance {
                Distance::Hamming => {
                    if symbol == required {
                        0
                    } else {
                        1
                    }
                }
                Distance::ScoringMatrix(matrix) => {
                    matrix.cost((required - 1) as usize, (symbol - 1) as usize) as usize
                }
                Distance::Edit => unreachable!("edit distance uses recurse_edit"),
            };

            let new_errors = errors + cost;

            let within_budget = match distance {
                Distance::ScoringMatrix(_) => new_errors <= upper,
                _ => new_errors >= lower && new_errors <= upper,
            };

            if !within_budget {
                continue;
            }

            let mut new_cursor = cursor;
            if direction_right {
                new_cursor.extend_right_dense(symbol);
            } else {
                new_cursor.extend_left_dense(symbol);
            }

            if new_cursor.count() == 0 {
                continue;
            }

            self.recurse_substitution(
                query_index,
                query,
                search,
                distance,
                num_symbols,
                new_cursor,
                step + 1,
                new_errors,
                next_lo,
                next_hi,
                callback,
            );
        }
    }

    /// Edit-distance search: at every step, try substitution (consumes the piece and
    /// a text symbol), insertion (consumes a text symbol but not a piece, i.e. the
    /// text has a symbol absent from the query) and deletion (consumes the piece but
    /// no text symbol, i.e. the query has a symbol absent from the text).
    #[allow(clippy::too_many_arguments)]
    fn recurse_edit(
        &self,
        query_index: usize,
        query: &[u8],
        search: &Search,
        num_symbols: u8,
        cursor: BiCursor<'_, I, B>,
        step: usize,
        query_consumed: usize,
        errors: usize,
        lo_seen: usize,
        hi_seen: usize,
        callback: &mut impl FnMut(usize, &BiCursor<'_, I, B>, usize),
    ) {
        if step == search.pi.len() {
            callback(query_index, &cursor, errors);
            return;
        }

        let lower = search.lower[step];
        let upper = search.upper[step];

        if errors > upper {
            return;
        }

        let piece = search.pi[step];
        let required = query[piece];
        let piece_direction_right = step == 0 || piece == hi_seen + 1;

        let (next_lo, next_hi) = if step == 0 {
            (piece, piece)
        } else if piece_direction_right {
            (lo_seen, piece)
        } else {
            (piece, hi_seen)
        };

        // substitution
        for symbol in 1..=num_symbols {
            let cost = if symbol == required { 0 } else { 1 };
            let new_errors = errors + cost;

            if new_errors < lower || new_errors > upper {
                continue;
            }

            let mut new_cursor = cursor;
            if piece_direction_right {
                new_cursor.extend_right_dense(symbol);
            } else {
                new_cursor.extend_left_dense(symbol);
            }

            if new_cursor.count() == 0 {
                continue;
            }

            self.recurse_edit(
                query_index,
                query,
                search,
                num_symbols,
                new_cursor,
                step + 1,
                query_consumed + 1,
                new_errors,
                next_lo,
                next_hi,
                callback,
            );
        }

        // insertion: stay on the same piece, consume only a text symbol, extending in
        // the direction this piece itself would be matched from
        let insertion_errors = errors + 1;
        if insertion_errors >= lower && insertion_errors <= upper {
            for symbol in 1..=num_symbols {
                let mut new_cursor = cursor;
                if piece_direction_right {
                    new_cursor.extend_right_dense(symbol);
                } else {
                    new_cursor.extend_left_dense(symbol);
                }

                if new_cursor.count() == 0 {
                    continue;
                }

                self.recurse_edit(
                    query_index,
                    query,
                    search,
                    num_symbols,
                    new_cursor,
                    step,
                    query_consumed + 1,
                    insertion_errors,
                    lo_seen,
                    hi_seen,
                    callback,
                );
            }
        }

        // deletion: consume only the piece, no text symbol
        let deletion_errors = errors + 1;
        if deletion_errors >= lower && deletion_errors <= upper {
            self.recurse_edit(
                query_index,
                query,
                search,
                num_symbols,
                cursor,
                step + 1,
                query_consumed,
                deletion_errors,
                next_lo,
                next_hi,
                callback,
            );
        }
    }
}

/// Accelerates an exact-match search (the `backtracking(n, 0, 0)` scheme) by
/// delegating to [`BiFmIndex::cursor_for_query`], which already consults the index's
/// precomputed k-mer lookup table (see [`crate::lookup_table`]) before falling back to
/// per-symbol backward search. The returned cursor's occurrence set is identical to
/// what [`Searcher::search`] would report for the same query under that scheme, since
/// both ultimately perform the same sequence of exact backward-search steps.
pub fn kmer_accelerated_exact_search<'a, I: IndexStorage, B: Block>(
    index: &'a BiFmIndex<I, B>,
    query: &[u8],
) -> BiCursor<'a, I, B> {
    index.cursor_for_query(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_schemes::generator::backtracking;
    use crate::{BiFmIndexConfig, alphabet};
    use std::collections::HashSet;

    fn dna_index() -> BiFmIndex<i32> {
        let texts = [
            b"ACGTACGTAA".as_slice(),
            b"TTGGACGTCC".as_slice(),
            b"AAAACGTTTT".as_slice(),
        ];

        BiFmIndexConfig::<i32>::new()
            .suffix_array_sampling_rate(1)
            .construct_index(texts, alphabet::ascii_dna())
            .unwrap()
    }

    fn naive_hamming_matches(texts: &[&[u8]], query: &[u8], max_k: usize) -> HashSet<(usize, usize)> {
        let mut found = HashSet::new();

        for (text_id, text) in texts.iter().enumerate() {
            if query.len() > text.len() {
                continue;
            }

            for start in 0..=(text.len() - query.len()) {
                let errors = text[start..start + query.len()]
                    .iter()
                    .zip(query)
                    .filter(|(a, b)| a != b)
                    .count();

                if errors <= max_k {
                    found.insert((text_id, start));
                }
            }
        }

        found
    }

    #[test]
    fn hamming_search_matches_naive_scan() {
        let index = dna_index();
        let texts: [&[u8]; 3] = [b"ACGTACGTAA", b"TTGGACGTCC", b"AAAACGTTTT"];
        let query = b"ACGT";

        for max_k in 0..=2 {
            let scheme = backtracking(query.len(), 0, max_k);
            let searcher = Searcher::new(&index);

            let matches = searcher
                .search_collect(&[query.as_slice()], &scheme, &Distance::Hamming)
                .unwrap();

            let found: HashSet<(usize, usize)> = matches
                .iter()
                .filter(|m| m.errors <= max_k)
                .map(|m| (m.hit.text_id, m.hit.position))
                .collect();

            let expected = naive_hamming_matches(&texts, query, max_k);
            assert_eq!(found, expected, "max_k={max_k}");
        }
    }

    #[test]
    fn scoring_matrix_identity_matches_hamming() {
        let index = dna_index();
        let query = b"ACGT";
        let scheme = backtracking(query.len(), 0, 1);
        let searcher = Searcher::new(&index);

        let hamming = searcher
            .search_collect(&[query.as_slice()], &scheme, &Distance::Hamming)
            .unwrap();

        let identity_matrix = ScoringMatrix::new(4, 4);
        let scoring = searcher
            .search_collect(
                &[query.as_slice()],
                &scheme,
                &Distance::ScoringMatrix(identity_matrix),
            )
            .unwrap();

        let as_set = |matches: &[Match]| -> HashSet<(usize, usize, usize)> {
            matches
                .iter()
                .map(|m| (m.hit.text_id, m.hit.position, m.errors))
                .collect()
        };

        assert_eq!(as_set(&hamming), as_set(&scoring));
    }

    #[test]
    fn edit_distance_finds_indel_occurrences() {
        let texts = [b"AAACCCGGGTTT".as_slice()];
        let index = BiFmIndexConfig::<i32>::new()
            .suffix_array_sampling_rate(1)
            .construct_index(texts, alphabet::ascii_dna())
            .unwrap();

        // query with one base deleted relative to "CCCGGG"
        let query = b"CCGGG";
        let scheme = backtracking(query.len(), 0, 1);
        let searcher = Searcher::new(&index);

        let matches = searcher
            .search_collect(&[query.as_slice()], &scheme, &Distance::Edit)
            .unwrap();

        assert!(
            matches
                .iter()
                .any(|m| m.hit.text_id == 0 && m.errors <= 1),
            "{matches:?}"
        );
    }

    #[test]
    fn kmer_accelerated_matches_plain_exact_search() {
        let index = dna_index();
        let query = b"ACGT";

        let scheme = backtracking(query.len(), 0, 0);
        let searcher = Searcher::new(&index);
        let plain = searcher
            .search_collect(&[query.as_slice()], &scheme, &Distance::Hamming)
            .unwrap();
        let plain_set: HashSet<Hit> = plain.into_iter().map(|m| m.hit).collect();

        let accelerated: HashSet<Hit> =
            kmer_accelerated_exact_search(&index, query).locate().collect();

        assert_eq!(plain_set, accelerated);
    }
}
