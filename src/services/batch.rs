//! Batch planning under an estimated token budget.

use crate::models::{Batch, Chunk};

/// Estimated token cost of a chunk: `floor(char_len * token_per_char)`.
pub fn estimate_tokens(chunk: &Chunk, token_per_char: f64) -> u64 {
    (chunk.char_len() as f64 * token_per_char) as u64
}

/// Group chunks, in order, into batches whose estimated token total stays
/// within `max_tokens`.
///
/// A running batch accumulates chunks until adding the next one would push
/// the total over the budget; the batch is then sealed and a new one opens
/// with that chunk. A single chunk whose own estimate exceeds the budget is
/// still emitted alone — chunks are never dropped or sub-split here.
/// Flattening the output reproduces the input sequence exactly.
pub fn plan_batches(chunks: &[Chunk], max_tokens: u64, token_per_char: f64) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current = Batch::new();

    for chunk in chunks {
        let chunk_tokens = estimate_tokens(chunk, token_per_char);

        if current.estimated_tokens + chunk_tokens > max_tokens {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
            }
            current.chunks.push(chunk.clone());
            current.estimated_tokens = chunk_tokens;
        } else {
            current.chunks.push(chunk.clone());
            current.estimated_tokens += chunk_tokens;
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks_of(sizes: &[usize]) -> Vec<Chunk> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| Chunk::new(i, "x".repeat(n)))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(plan_batches(&[], 100, 0.25).is_empty());
    }

    #[test]
    fn test_token_estimate_floors() {
        let chunk = Chunk::new(0, "x".repeat(7));
        assert_eq!(estimate_tokens(&chunk, 0.25), 1);
        assert_eq!(estimate_tokens(&chunk, 0.5), 3);
    }

    #[test]
    fn test_budget_respected_on_seal() {
        // 10 chunks of 100 chars at 0.25 tokens/char: 25 tokens each.
        let chunks = chunks_of(&[100; 10]);
        let batches = plan_batches(&chunks, 60, 0.25);

        for batch in &batches {
            if batch.len() > 1 {
                assert!(batch.estimated_tokens <= 60);
            }
        }
        // 2 chunks per batch (25 + 25 = 50; a third would reach 75).
        assert_eq!(batches.len(), 5);
        assert!(batches.iter().all(|b| b.len() == 2));
    }

    #[test]
    fn test_order_preserving() {
        let chunks = chunks_of(&[40, 80, 10, 200, 5, 5, 90]);
        let batches = plan_batches(&chunks, 30, 0.25);

        let flattened: Vec<Chunk> = batches.into_iter().flat_map(|b| b.chunks).collect();
        assert_eq!(flattened, chunks);
    }

    #[test]
    fn test_oversized_chunk_emitted_alone() {
        // Middle chunk costs 250 tokens against a 30-token budget.
        let chunks = chunks_of(&[40, 1000, 40]);
        let batches = plan_batches(&chunks, 30, 0.25);

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[1].len(), 1);
        assert_eq!(batches[1].chunks[0].index, 1);
        assert!(batches[1].estimated_tokens > 30);
    }

    #[test]
    fn test_single_batch_under_budget() {
        // 3 chunks (2048, 2048, 904 chars) at 0.25 tokens/char ≈ 1250
        // tokens, well within a 16000-token budget.
        let chunks = chunks_of(&[2048, 2048, 904]);
        let batches = plan_batches(&chunks, 16_000, 0.25);

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[0].estimated_tokens, 512 + 512 + 226);
    }
}
