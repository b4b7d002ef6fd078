//! Exact k-nearest-neighbor lookup by Euclidean distance.
//!
//! Brute force: every query measures the distance to every stored vector and
//! ranks all of them. Ranking uses a stable sort keyed on distance alone, so
//! equidistant vectors keep their insertion order.

use crate::embeddings::EmbeddingVector;
use crate::error::DocQaError;
use crate::error::Result;

/// Euclidean (L2) distance between two vectors of equal length.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(DocQaError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt())
}

/// What a neighbor query hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum Neighbors<'a> {
    /// Positions of the nearest stored vectors.
    Indices(Vec<usize>),
    /// The nearest stored vectors themselves.
    Embeddings(Vec<&'a [f32]>),
}

#[derive(Debug, Clone)]
pub struct NearestNeighborIndex {
    neighbor_count: usize,
    embeddings: Vec<EmbeddingVector>,
    dimensions: Option<usize>,
}

impl NearestNeighborIndex {
    /// Configure an empty index that will return `neighbor_count` results per query.
    pub fn new(neighbor_count: usize) -> Result<Self> {
        if neighbor_count == 0 {
            return Err(DocQaError::configuration("neighbor count must be at least 1"));
        }
        Ok(Self {
            neighbor_count,
            embeddings: Vec::new(),
            dimensions: None,
        })
    }

    pub const fn neighbor_count(&self) -> usize {
        self.neighbor_count
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn embeddings(&self) -> &[EmbeddingVector] {
        &self.embeddings
    }

    /// Dimensionality shared by every stored vector, once fitted.
    pub const fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Store `embeddings`, replacing anything fitted before.
    ///
    /// The neighbor count is not clamped here: callers holding fewer vectors than
    /// `neighbor_count` must clamp before fitting.
    pub fn fit(&mut self, embeddings: Vec<EmbeddingVector>) -> Result<()> {
        if self.neighbor_count > embeddings.len() {
            return Err(DocQaError::configuration(format!(
                "neighbor count {} exceeds the {} stored embeddings",
                self.neighbor_count,
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len);
        if let Some(expected) = dimensions
            && let Some(odd) = embeddings.iter().find(|e| e.len() != expected)
        {
            return Err(DocQaError::DimensionMismatch {
                expected,
                actual: odd.len(),
            });
        }

        self.embeddings = embeddings;
        self.dimensions = dimensions;
        Ok(())
    }

    /// Every stored position ranked by ascending distance to `query`.
    pub fn rank(&self, query: &[f32]) -> Result<Vec<(usize, f32)>> {
        let mut ranked = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(idx, stored)| euclidean_distance(stored, query).map(|d| (idx, d)))
            .collect::<Result<Vec<_>>>()?;

        // `sort_by` is stable, ties stay in insertion order.
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(ranked)
    }

    /// The `neighbor_count` closest stored vectors, nearest first.
    pub fn query(&self, query: &[f32], return_data: bool) -> Result<Neighbors<'_>> {
        let nearest = self.kneighbors(query)?;
        if return_data {
            Ok(Neighbors::Embeddings(
                nearest
                    .into_iter()
                    .map(|idx| self.embeddings[idx].as_slice())
                    .collect(),
            ))
        } else {
            Ok(Neighbors::Indices(nearest))
        }
    }

    /// Positions of the `neighbor_count` closest stored vectors, nearest first.
    pub fn kneighbors(&self, query: &[f32]) -> Result<Vec<usize>> {
        let mut ranked = self.rank(query)?;
        ranked.truncate(self.neighbor_count);
        Ok(ranked.into_iter().map(|(idx, _)| idx).collect())
    }
}
