//! Domain models for the RAG pipeline.

mod config;

pub use config::{
    ApiConfig, ChunkingConfig, Config, DocumentConfig, RetryConfig, SearchConfig,
};

/// A bounded-length substring of the source document.
///
/// `index` is the chunk's position in the original ordered sequence and is
/// carried through batching so the embedding pipeline can assert that the
/// final embedding order matches the input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Character length of the chunk text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// An ordered group of chunks submitted together to the embedding endpoint.
///
/// `estimated_tokens` is the running total accumulated by the batch planner.
/// At seal time it never exceeds the configured budget, except for a single
/// chunk whose own estimate already does (chunks are never sub-split).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub chunks: Vec<Chunk>,
    pub estimated_tokens: u64,
}

impl Batch {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            estimated_tokens: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk texts in submission order.
    pub fn texts(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.text.clone()).collect()
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}
