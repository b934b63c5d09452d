//! Error types for the RAG pipeline.

use thiserror::Error;

/// Errors produced by the pipeline and its remote collaborators.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("unexpected remote error: {0}")]
    Unexpected(String),

    #[error("retry budget exceeded after {attempts} attempts")]
    RetryBudgetExceeded { attempts: u32 },

    #[error("embedding fetch failed: {0}")]
    EmbeddingFetchFailed(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Marker substring the embedding endpoint uses for oversized batches.
/// Matched exactly, case-sensitive, for wire compatibility.
const TOO_MANY_TOKENS: &str = "Too many tokens in batch";

/// Marker substring for throttling responses. Matched case-insensitively.
const RATE_LIMIT: &str = "rate limit";

/// Classify an opaque remote failure message into the error taxonomy.
///
/// Remote endpoints signal throttling and oversized payloads only through
/// the text of their error responses, so classification is a substring
/// match. The matching strings live here and nowhere else.
pub fn classify_remote(message: &str) -> RagError {
    if message.to_lowercase().contains(RATE_LIMIT) {
        RagError::RateLimited(message.to_string())
    } else if message.contains(TOO_MANY_TOKENS) {
        RagError::PayloadTooLarge(message.to_string())
    } else {
        RagError::Unexpected(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit_case_insensitive() {
        assert!(matches!(
            classify_remote("status 429: Requests Rate Limit exceeded"),
            RagError::RateLimited(_)
        ));
        assert!(matches!(
            classify_remote("RATE LIMIT hit"),
            RagError::RateLimited(_)
        ));
    }

    #[test]
    fn test_classify_payload_too_large_exact() {
        assert!(matches!(
            classify_remote("status 400: Too many tokens in batch"),
            RagError::PayloadTooLarge(_)
        ));
        // Exact substring only; a case variant is not the protocol marker.
        assert!(matches!(
            classify_remote("too many tokens in batch"),
            RagError::Unexpected(_)
        ));
    }

    #[test]
    fn test_classify_unexpected_fallback() {
        assert!(matches!(
            classify_remote("status 500: internal error"),
            RagError::Unexpected(_)
        ));
    }
}
