//! Fixed-size text chunking.

use crate::error::RagError;
use crate::models::Chunk;

/// Split `text` into non-overlapping chunks of exactly `chunk_size`
/// characters, except the final chunk which holds the remainder.
///
/// Empty input produces no chunks. Splitting is by `char`, so multi-byte
/// text never breaks inside a code point. A zero chunk size is a caller
/// contract violation.
pub fn chunk_text(text: &str, chunk_size: usize) -> Result<Vec<Chunk>, RagError> {
    if chunk_size == 0 {
        return Err(RagError::InvalidArgument(
            "chunk_size must be positive".to_string(),
        ));
    }

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let chunks = chars
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, window)| Chunk::new(index, window.iter().collect::<String>()))
        .collect();

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let chunks = chunk_text("", 64).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            chunk_text("abc", 0),
            Err(RagError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_exact_sizes_and_remainder() {
        let text = "a".repeat(5000);
        let chunks = chunk_text(&text, 2048).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].char_len(), 2048);
        assert_eq!(chunks[1].char_len(), 2048);
        assert_eq!(chunks[2].char_len(), 904);
    }

    #[test]
    fn test_concatenation_reconstructs_input() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(37);
        let chunks = chunk_text(&text, 100).unwrap();

        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            if i + 1 < chunks.len() {
                assert_eq!(chunk.char_len(), 100);
            } else {
                assert!(chunk.char_len() >= 1 && chunk.char_len() <= 100);
            }
        }
    }

    #[test]
    fn test_multibyte_boundaries() {
        let text = "héllo wörld ünïcode".repeat(10);
        let chunks = chunk_text(&text, 7).unwrap();

        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.char_len(), 7);
        }
    }

    #[test]
    fn test_input_shorter_than_chunk_size() {
        let chunks = chunk_text("short", 2048).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short");
    }
}
