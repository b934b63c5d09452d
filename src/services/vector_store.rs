//! In-memory flat vector index with exact inner-product search.

use crate::error::RagError;

/// A flat (brute-force) index over fixed-dimension dense vectors.
///
/// Ids are insertion positions, so they line up with the chunk sequence the
/// vectors were produced from. Inner product equals cosine similarity for
/// normalized vectors. Nothing is persisted.
#[derive(Debug)]
pub struct FlatIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append vectors to the index. Ids continue from the current length.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), RagError> {
        for vector in &vectors {
            if vector.len() != self.dim {
                return Err(RagError::InvalidArgument(format!(
                    "vector dimension {} does not match index dimension {}",
                    vector.len(),
                    self.dim
                )));
            }
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    /// Exact top-k search by inner product. Returns `(scores, ids)` sorted
    /// by descending score; at most `min(k, len)` results.
    pub fn search(&self, query: &[f32], k: usize) -> Result<(Vec<f32>, Vec<usize>), RagError> {
        if query.len() != self.dim {
            return Err(RagError::InvalidArgument(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dim
            )));
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, vector)| (dot(query, vector), id))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        Ok(scored.into_iter().unzip())
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
