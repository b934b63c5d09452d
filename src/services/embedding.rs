//! Batched embedding with adaptive retry, backoff, and batch splitting.
//!
//! Batches flow through an explicit FIFO work queue. A batch rejected as
//! oversized is replanned over its own chunks with a halved budget and the
//! replacements go back at the front of the queue, so granularity changes
//! but order never does. Rate limiting is absorbed by the retry policy;
//! an exhausted retry budget aborts the whole pipeline.

use std::collections::VecDeque;

use crate::client::EmbeddingBackend;
use crate::error::RagError;
use crate::models::{Batch, Chunk, ChunkingConfig};
use crate::services::batch::plan_batches;
use crate::utils::retry::{RetryPolicy, with_retry};

/// Parameters for the embedding calls.
#[derive(Debug, Clone)]
pub struct EmbeddingParams {
    pub model: String,
    pub max_tokens: u64,
    pub token_per_char: f64,
}

impl EmbeddingParams {
    pub fn new(model: impl Into<String>, chunking: &ChunkingConfig) -> Self {
        Self {
            model: model.into(),
            max_tokens: chunking.max_tokens,
            token_per_char: chunking.token_per_char,
        }
    }
}

/// Drives the batch planner and a remote embedding backend to produce one
/// embedding per chunk, in original order.
pub struct EmbeddingPipeline<B> {
    backend: B,
    params: EmbeddingParams,
    policy: RetryPolicy,
    query_policy: RetryPolicy,
}

impl<B: EmbeddingBackend> EmbeddingPipeline<B> {
    pub fn new(backend: B, params: EmbeddingParams, policy: RetryPolicy) -> Self {
        let query_policy = policy.clone();
        Self {
            backend,
            params,
            policy,
            query_policy,
        }
    }

    /// Use a different retry policy for single-query embedding.
    #[must_use]
    pub fn with_query_policy(mut self, policy: RetryPolicy) -> Self {
        self.query_policy = policy;
        self
    }

    /// Embed every chunk, returning vectors positionally aligned with the
    /// input sequence.
    ///
    /// Fails with `RetryBudgetExceeded` if any batch exhausts its retries,
    /// with `PayloadTooLarge` if a batch stays oversized after its budget
    /// has been halved down to nothing, and with `EmbeddingFetchFailed` if
    /// the collected result does not line up 1:1 with the input.
    pub async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>, RagError> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let initial = plan_batches(chunks, self.params.max_tokens, self.params.token_per_char);
        let mut queue: VecDeque<(u64, Batch)> = initial
            .into_iter()
            .map(|batch| (self.params.max_tokens, batch))
            .collect();

        let mut collected: Vec<(usize, Vec<f32>)> = Vec::with_capacity(chunks.len());
        let mut completed = 0usize;

        while let Some((budget, batch)) = queue.pop_front() {
            eprintln!(
                "processing batch {} with {} chunks ({} remaining)...",
                completed + 1,
                batch.len(),
                queue.len()
            );

            let texts = batch.texts();
            let result = with_retry(&self.policy, || {
                self.backend.embed(&self.params.model, &texts)
            })
            .await;

            match result {
                Ok(vectors) => {
                    if vectors.len() != batch.len() {
                        return Err(RagError::EmbeddingFetchFailed(format!(
                            "endpoint returned {} vectors for {} inputs",
                            vectors.len(),
                            batch.len()
                        )));
                    }
                    let indices = batch.chunks.iter().map(|c| c.index);
                    collected.extend(indices.zip(vectors));
                    completed += 1;
                }
                Err(RagError::PayloadTooLarge(message)) => {
                    let halved = budget / 2;
                    if halved == 0 {
                        // Budget can shrink no further; a still-oversized
                        // batch at this point is fatal.
                        return Err(RagError::PayloadTooLarge(message));
                    }
                    eprintln!("batch over the token limit; replanning with budget {halved}");
                    let replacements =
                        plan_batches(&batch.chunks, halved, self.params.token_per_char);
                    for smaller in replacements.into_iter().rev() {
                        queue.push_front((halved, smaller));
                    }
                }
                Err(err) => return Err(err),
            }
        }

        self.into_ordered_vectors(chunks, collected)
    }

    /// Embed a single query string. Same retry policy shape, no batching.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let inputs = vec![text.to_string()];
        let vectors = with_retry(&self.query_policy, || {
            self.backend.embed(&self.params.model, &inputs)
        })
        .await?;

        vectors.into_iter().next().ok_or_else(|| {
            RagError::EmbeddingFetchFailed("empty embedding response for query".to_string())
        })
    }

    /// Assert the pipeline postcondition: one vector per chunk, and the
    /// collected positions are exactly the input positions in order.
    /// Subdivision only changes granularity, so a mismatch here means the
    /// ordering invariant was broken somewhere upstream.
    fn into_ordered_vectors(
        &self,
        chunks: &[Chunk],
        collected: Vec<(usize, Vec<f32>)>,
    ) -> Result<Vec<Vec<f32>>, RagError> {
        if collected.len() != chunks.len() {
            return Err(RagError::EmbeddingFetchFailed(format!(
                "collected {} embeddings for {} chunks",
                collected.len(),
                chunks.len()
            )));
        }

        let aligned = collected
            .iter()
            .zip(chunks)
            .all(|((index, _), chunk)| *index == chunk.index);
        if !aligned {
            return Err(RagError::EmbeddingFetchFailed(
                "embedding order does not match chunk order".to_string(),
            ));
        }

        Ok(collected.into_iter().map(|(_, vector)| vector).collect())
    }
}
