//! The search-scheme data model: [`Search`]/[`Scheme`], validity and completeness
//! predicates, expansion to a concrete pattern length, and the naive-node-count
//! estimators used to pick among equivalent schemes.
//!
//! A search scheme splits a pattern of length `p` into `p` abstract pieces and
//! specifies, for every search, the order pieces are matched in (`pi`, a permutation
//! of `0..p`) and the admissible cumulative error after each step (`lower`/`upper`).
//! [`expand`] refines a scheme generated for a small `p` (as the generators in
//! [`crate::search_schemes::generator`] do) onto the actual number of query
//! characters.

pub mod generator;

use crate::error::{Error, Result};

/// One search within a [`Scheme`]: a piece visitation order plus, per step, the
/// admissible range of cumulative errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
pub struct Search {
    pub pi: Vec<usize>,
    pub lower: Vec<usize>,
    pub upper: Vec<usize>,
}

impl Search {
    pub fn new(pi: Vec<usize>, lower: Vec<usize>, upper: Vec<usize>) -> Self {
        Self { pi, lower, upper }
    }

    pub fn num_pieces(&self) -> usize {
        self.pi.len()
    }

    /// `π` is a permutation of `[0,p)` and every prefix `π[0..k]` is a contiguous
    /// interval of piece values, `lower`/`upper` are the same length as `pi`,
    /// non-decreasing, and `lower[k] <= upper[k]` everywhere.
    pub fn is_valid(&self) -> bool {
        let p = self.pi.len();

        if p == 0 || self.lower.len() != p || self.upper.len() != p {
            return false;
        }

        let mut seen = vec![false; p];
        for &piece in &self.pi {
            if piece >= p || seen[piece] {
                return false;
            }
            seen[piece] = true;
        }

        let mut lo = self.pi[0];
        let mut hi = self.pi[0];
        for &piece in &self.pi[1..] {
            if piece == hi + 1 {
                hi = piece;
            } else if piece + 1 == lo {
                lo = piece;
            } else {
                return false;
            }
        }

        self.lower.windows(2).all(|w| w[0] <= w[1])
            && self.upper.windows(2).all(|w| w[0] <= w[1])
            && self.lower.iter().zip(&self.upper).all(|(l, u)| l <= u)
    }

    /// Cumulative error after each step of `pi`, given the per-piece error vector
    /// `errors_by_piece` (indexed by piece value, not by step). Returns `false` as soon
    /// as a step falls outside `[lower[k], upper[k]]`.
    fn covers(&self, errors_by_piece: &[usize]) -> bool {
        let mut cumulative = 0;

        for (k, &piece) in self.pi.iter().enumerate() {
            cumulative += errors_by_piece[piece];

            if cumulative < self.lower[k] || cumulative > self.upper[k] {
                return false;
            }
        }

        true
    }
}

/// A non-empty collection of [`Search`]es, all over the same number of pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
pub struct Scheme {
    pub searches: Vec<Search>,
}

impl Scheme {
    pub fn new(searches: Vec<Search>) -> Self {
        Self { searches }
    }

    pub fn single(search: Search) -> Self {
        Self {
            searches: vec![search],
        }
    }

    pub fn num_pieces(&self) -> usize {
        self.searches[0].num_pieces()
    }

    /// Every search is individually valid and all searches share the same piece count.
    pub fn is_valid(&self) -> bool {
        if self.searches.is_empty() {
            return false;
        }

        let p = self.searches[0].num_pieces();
        self.searches
            .iter()
            .all(|s| s.num_pieces() == p && s.is_valid())
    }

    /// Every error pattern `e in [0,maxK]^p` with `minK <= sum(e) <= maxK` is covered
    /// by at least one search. Enumerated via backtracking over a budget-limited
    /// assignment rather than the full `(maxK+1)^p` grid, so this stays cheap even for
    /// the domains exercised by the generators in [`generator`].
    pub fn is_complete(&self, min_k: usize, max_k: usize) -> bool {
        let p = self.num_pieces();
        let mut errors = vec![0usize; p];
        complete_recurse(self, min_k, max_k, &mut errors, 0, 0)
    }

    /// Checks that the query length implied by the searches (the number of pieces)
    /// matches a caller-provided pattern length, used by the searcher before running
    /// a scheme over a query.
    pub(crate) fn validate_pattern_length(&self, query_length: usize) -> Result<()> {
        if self.num_pieces() != query_length {
            return Err(Error::SchemePatternLengthMismatch {
                scheme_length: self.num_pieces(),
                query_length,
            });
        }

        Ok(())
    }
}

fn complete_recurse(
    scheme: &Scheme,
    min_k: usize,
    max_k: usize,
    errors: &mut [usize],
    idx: usize,
    partial_sum: usize,
) -> bool {
    if idx == errors.len() {
        if partial_sum < min_k {
            return true;
        }

        return scheme.searches.iter().any(|s| s.covers(errors));
    }

    for value in 0..=(max_k - partial_sum) {
        errors[idx] = value;

        if !complete_recurse(scheme, min_k, max_k, errors, idx + 1, partial_sum + value) {
            return false;
        }
    }

    true
}

/// Refines `scheme` (over `p` pieces) onto `n >= p` pieces, preserving validity and
/// completeness.
///
/// Each original piece value `v` is assigned a contiguous block of `n`-pieces via
/// `floor(j*p/n)`; within a search, a block is visited left-to-right if its piece is
/// reached by extending the covered interval to the right, and right-to-left if
/// reached by extending to the left (matching the bidirectional extension direction a
/// [`crate::BiCursor`] would actually take). Every sub-step but the block's last
/// inherits the previous piece's lower bound and the block's own upper bound; the
/// last sub-step gets the block's exact bounds, so any valid trajectory through the
/// finer scheme collapses back onto a valid trajectory through the original one.
pub fn expand(scheme: &Scheme, n: usize) -> Scheme {
    let searches = scheme.searches.iter().map(|s| expand_search(s, n)).collect();
    Scheme { searches }
}

fn expand_search(search: &Search, n: usize) -> Search {
    let p = search.num_pieces();
    assert!(n >= p);

    // block_of[v] = [start, end) of new-resolution piece indices assigned to
    // original piece value v
    let mut block_of = vec![(0usize, 0usize); p];
    for v in 0..p {
        let start = v * n / p;
        let end = (v + 1) * n / p;
        block_of[v] = (start, end);
    }

    let mut new_pi = Vec::with_capacity(n);
    let mut new_lower = Vec::with_capacity(n);
    let mut new_upper = Vec::with_capacity(n);

    let mut lo_seen = search.pi[0];
    let mut hi_seen = search.pi[0];

    for (k, &v) in search.pi.iter().enumerate() {
        let (start, end) = block_of[v];
        let ascending = k == 0 || v == hi_seen + 1;

        if k > 0 {
            if v == hi_seen + 1 {
                hi_seen = v;
            } else {
                lo_seen = v;
            }
        }

        let prev_lower = if k == 0 { 0 } else { search.lower[k - 1] };
        let block_len = end - start;

        for step in 0..block_len {
            let is_last = step + 1 == block_len;
            let piece_idx = if ascending {
                start + step
            } else {
                end - 1 - step
            };

            new_pi.push(piece_idx);
            new_lower.push(if is_last { search.lower[k] } else { prev_lower });
            new_upper.push(search.upper[k]);
        }
    }

    Search {
        pi: new_pi,
        lower: new_lower,
        upper: new_upper,
    }
}

/// The distance notion used by [`node_count`]/[`weighted_node_count`] to estimate the
/// per-step branching factor of a naive backtracking executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCountDistance {
    Hamming,
    Edit,
}

impl NodeCountDistance {
    /// Number of ways a single step of backward search can branch at cost `1`: one
    /// matching symbol always costs `0`, the rest cost `1`. Edit distance additionally
    /// allows an insertion and a deletion at every step; there is no published
    /// reference node-count formula for edit distance to match exactly, so this
    /// doubles the mismatch branching plus one (for the deletion branch) as a
    /// conservative estimate.
    fn mismatch_multiplier(self, sigma: usize) -> u64 {
        match self {
            NodeCountDistance::Hamming => sigma.saturating_sub(1) as u64,
            NodeCountDistance::Edit => (2 * sigma.saturating_sub(1) + 1) as u64,
        }
    }
}

/// Estimates the number of rank-string probes a naive backtracking executor of
/// `scheme` would perform, summed across all of its searches (no sharing between
/// searches is assumed). `sigma` is the searchable alphabet size.
pub fn node_count(scheme: &Scheme, sigma: usize, distance: NodeCountDistance) -> u64 {
    scheme
        .searches
        .iter()
        .map(|s| search_node_count(s, sigma, distance, None))
        .sum()
}

/// Like [`node_count`], but damps the contribution of deep steps once `sigma^depth`
/// exceeds `text_len`: a real index of that size cannot actually have more matches at
/// that depth than `text_len / sigma^depth`, so counting a full `sigma`-way branch
/// there overstates the real work. Used to compare schemes' expected running time on
/// a concrete index rather than their raw worst-case branching.
pub fn weighted_node_count(
    scheme: &Scheme,
    sigma: usize,
    text_len: usize,
    distance: NodeCountDistance,
) -> f64 {
    scheme
        .searches
        .iter()
        .map(|s| search_node_count(s, sigma, distance, Some(text_len)) as f64)
        .sum::<f64>()
}

// shared DP: state[e] = number of paths with cumulative error e through steps [0, k).
// at each step, fold in the (cost, ways) branch table, clamp to [lower[k], upper[k]].
// returns the node count as u64 for the unweighted case (damping == None), else reuses
// the same integer substitution-counting DP but the caller re-derives the weighted sum
// from the bigint-free per-depth totals this function also validates.
fn search_node_count(
    search: &Search,
    sigma: usize,
    distance: NodeCountDistance,
    damping_text_len: Option<usize>,
) -> u64 {
    let p = search.num_pieces();
    let max_error = *search.upper.last().unwrap_or(&0);
    let mut state = vec![0u128; max_error + 1];
    state[0] = 1;

    let mismatch_ways = distance.mismatch_multiplier(sigma) as u128;
    let mut total_weighted = 0.0_f64;
    let mut total_plain: u128 = 0;

    for k in 0..p {
        let lo = search.lower[k];
        let hi = search.upper[k].min(max_error);

        let mut next = vec![0u128; max_error + 1];
        for (e, &ways) in state.iter().enumerate() {
            if ways == 0 {
                continue;
            }

            // match, cost 0
            if e <= hi {
                next[e] += ways;
            }
            // mismatch (and, approximately for edit, indel), cost 1
            if e + 1 <= max_error {
                next[e + 1] += ways * mismatch_ways;
            }
        }

        for e in 0..next.len() {
            if e < lo || e > hi {
                next[e] = 0;
            }
        }

        state = next;

        let depth_nodes: u128 = state.iter().sum();
        total_plain += depth_nodes;

        let weight = match damping_text_len {
            None => 1.0,
            Some(text_len) => {
                let capacity = (sigma as f64).powi((k + 1) as i32);
                (text_len as f64 / capacity).min(1.0)
            }
        };

        total_weighted += depth_nodes as f64 * weight;
    }

    if damping_text_len.is_some() {
        total_weighted.round() as u64
    } else {
        total_plain as u64
    }
}

/// Parses a search-scheme text file: one `pi l u` triple per line (elements
/// space-separated), blank lines separating searches (currently: every line is its
/// own search, since one search per line is what [`write_text`] emits).
pub fn parse_text(text: &str) -> Result<Scheme> {
    let mut searches = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(';').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidScheme {
                reason: "expected 'pi;l;u' with space-separated elements",
            });
        }

        let parse_vec = |s: &str| -> Result<Vec<usize>> {
            s.split_whitespace()
                .map(|tok| {
                    tok.parse::<usize>().map_err(|_| Error::InvalidScheme {
                        reason: "non-integer element in search scheme line",
                    })
                })
                .collect()
        };

        searches.push(Search {
            pi: parse_vec(parts[0])?,
            lower: parse_vec(parts[1])?,
            upper: parse_vec(parts[2])?,
        });
    }

    if searches.is_empty() {
        return Err(Error::InvalidScheme {
            reason: "search scheme file contained no searches",
        });
    }

    Ok(Scheme { searches })
}

/// Serializes a scheme in the line-based text format [`parse_text`] reads back.
pub fn write_text(scheme: &Scheme) -> String {
    let mut out = String::new();

    for search in &scheme.searches {
        let join = |v: &[usize]| {
            v.iter()
                .map(|x| x.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };

        out.push_str(&join(&search.pi));
        out.push(';');
        out.push_str(&join(&search.lower));
        out.push(';');
        out.push_str(&join(&search.upper));
        out.push('\n');
    }

    out
}
