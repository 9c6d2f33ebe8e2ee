use rayon::prelude::*;
use std::cmp::Ordering;

use crate::{error::AppResult, store::SimilarityMatrix};

/// Canonical neighbour order: score descending, then row index ascending
fn canonical_order(scores: &[f64], a: usize, b: usize) -> Ordering {
    scores[b].total_cmp(&scores[a]).then(a.cmp(&b))
}

/// Every column of a score row, fully sorted in canonical order
fn sorted_row(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_unstable_by(|&a, &b| canonical_order(scores, a, b));
    order
}

/// The first `depth` columns of the canonical order
fn sorted_prefix(scores: &[f64], depth: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    if depth < order.len() {
        order.select_nth_unstable_by(depth, |&a, &b| canonical_order(scores, a, b));
        order.truncate(depth);
    }
    order.sort_unstable_by(|&a, &b| canonical_order(scores, a, b));
    order
}

/// Ranks catalog rows by precomputed similarity
///
/// Optionally keeps a per-row prefix of the canonical order. A query that can be
/// answered from the prefix skips the sort; otherwise it falls back to sorting the
/// full row, so results never depend on whether the prefix exists.
pub struct SimilarityRanker {
    matrix: SimilarityMatrix,
    prefixes: Option<Vec<Vec<usize>>>,
}

impl SimilarityRanker {
    pub fn new(matrix: SimilarityMatrix) -> Self {
        Self {
            matrix,
            prefixes: None,
        }
    }

    /// Precomputes the first `depth` neighbours of every row in parallel
    pub fn with_ranking_depth(mut self, depth: usize) -> Self {
        if depth == 0 {
            self.prefixes = None;
            return self;
        }

        let dimension = self.matrix.dimension();
        let prefixes: Vec<Vec<usize>> = (0..dimension)
            .into_par_iter()
            .map(|row| {
                let start = row * dimension;
                let scores = &self.matrix.scores()[start..start + dimension];
                sorted_prefix(scores, depth)
            })
            .collect();

        tracing::info!(rows = dimension, depth = depth, "Built ranking index");

        self.prefixes = Some(prefixes);
        self
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Number of rows the ranker covers
    pub fn dimension(&self) -> usize {
        self.matrix.dimension()
    }

    /// Up to `k` rows most similar to `row`, best first
    ///
    /// Rows rejected by `predicate` are skipped, never replaced by padding.
    /// Fails with `IndexOutOfRange` when `row` is not in the matrix.
    pub fn top_k_similar(
        &self,
        row: usize,
        k: usize,
        exclude_self: bool,
        predicate: Option<&dyn Fn(usize) -> bool>,
    ) -> AppResult<Vec<usize>> {
        let scores = self.matrix.row(row)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let accept = |candidate: usize| {
            !(exclude_self && candidate == row) && predicate.map_or(true, |p| p(candidate))
        };

        if let Some(prefix) = self.prefixes.as_ref().map(|p| &p[row]) {
            let picked: Vec<usize> = prefix
                .iter()
                .copied()
                .filter(|&c| accept(c))
                .take(k)
                .collect();
            if picked.len() == k || prefix.len() == scores.len() {
                return Ok(picked);
            }
        }

        Ok(sorted_row(scores)
            .into_iter()
            .filter(|&c| accept(c))
            .take(k)
            .collect())
    }
}
