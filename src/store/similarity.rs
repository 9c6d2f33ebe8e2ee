use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Dense square matrix of precomputed similarity scores, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dimension: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Builds the matrix from its rows; every row must have one score per row
    pub fn from_rows(rows: Vec<Vec<f64>>) -> AppResult<Self> {
        let dimension = rows.len();
        let mut scores = Vec::with_capacity(dimension * dimension);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(AppError::DataLoad(format!(
                    "Similarity row {} has {} scores, expected {}",
                    i,
                    row.len(),
                    dimension
                )));
            }
            if let Some(j) = row.iter().position(|s| !s.is_finite()) {
                return Err(AppError::DataLoad(format!(
                    "Similarity score ({}, {}) is not finite",
                    i, j
                )));
            }
            scores.extend(row);
        }

        Ok(Self { dimension, scores })
    }

    /// Reads the matrix from disk. `.bin` files are bincode, anything else JSON.
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::DataLoad(format!(
                "Cannot open similarity matrix {}: {}",
                path.display(),
                e
            ))
        })?;
        let reader = BufReader::new(file);

        let is_binary = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"));

        let rows: Vec<Vec<f64>> = if is_binary {
            bincode::deserialize_from(reader).map_err(|e| {
                AppError::DataLoad(format!(
                    "Malformed similarity matrix {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            serde_json::from_reader(reader).map_err(|e| {
                AppError::DataLoad(format!(
                    "Malformed similarity matrix {}: {}",
                    path.display(),
                    e
                ))
            })?
        };

        let matrix = Self::from_rows(rows)?;

        tracing::info!(
            path = %path.display(),
            dimension = matrix.dimension(),
            "Loaded similarity matrix"
        );

        Ok(matrix)
    }

    /// Number of rows (and columns)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// All scores, row-major
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Scores of `row` against every row
    pub fn row(&self, row: usize) -> AppResult<&[f64]> {
        if row >= self.dimension {
            return Err(AppError::IndexOutOfRange {
                index: row,
                len: self.dimension,
            });
        }
        let start = row * self.dimension;
        Ok(&self.scores[start..start + self.dimension])
    }

    pub fn score(&self, row: usize, col: usize) -> AppResult<f64> {
        let scores = self.row(row)?;
        scores
            .get(col)
            .copied()
            .ok_or(AppError::IndexOutOfRange {
                index: col,
                len: self.dimension,
            })
    }
}
