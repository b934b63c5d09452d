use serde::{Deserialize, Serialize};

use crate::error::RagError;

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_EMBED_MODEL: &str = "mistral-embed";
pub const DEFAULT_CHAT_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_DOCUMENT_URL: &str = "https://raw.githubusercontent.com/run-llama/llama_index/main/docs/docs/examples/data/paul_graham/paul_graham_essay.txt";

/// Environment variable holding the API key. Absence is a fatal startup
/// error; there is no unauthenticated mode.
pub const API_KEY_VAR: &str = "MISTRAL_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    pub fn config_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join("ragpipe").join("config.toml"))
    }

    pub fn load() -> Result<Self, RagError> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| RagError::InvalidArgument(format!("config parse error: {e}")))?;
            return Ok(config);
        }
        Ok(Self::default())
    }

    /// Read the API key from the process environment.
    pub fn api_key(&self) -> Result<String, RagError> {
        std::env::var(API_KEY_VAR).map_err(|_| {
            RagError::InvalidArgument(format!(
                "{API_KEY_VAR} not found in environment variables"
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_embed_model() -> String {
    DEFAULT_EMBED_MODEL.to_string()
}

fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            embed_model: default_embed_model(),
            chat_model: default_chat_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_document_url")]
    pub url: String,

    #[serde(default = "default_save_path")]
    pub save_path: String,
}

fn default_document_url() -> String {
    DEFAULT_DOCUMENT_URL.to_string()
}

fn default_save_path() -> String {
    "essay.txt".to_string()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            url: default_document_url(),
            save_path: default_save_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Chunk size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Estimated-token budget per embedding batch.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,

    /// Character-to-token conversion factor for the estimate.
    #[serde(default = "default_token_per_char")]
    pub token_per_char: f64,
}

fn default_chunk_size() -> usize {
    2048
}

fn default_max_tokens() -> u64 {
    16_000
}

fn default_token_per_char() -> f64 {
    0.25
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_tokens: default_max_tokens(),
            token_per_char: default_token_per_char(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_factor() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of passages retrieved for the prompt context.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    2
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.embed_model, DEFAULT_EMBED_MODEL);
        assert_eq!(config.chunking.chunk_size, 2048);
        assert_eq!(config.chunking.max_tokens, 16_000);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.search.top_k, 2);
    }

    #[test]
    fn test_config_path() {
        assert!(Config::config_path().is_some());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[chunking]\nchunk_size = 512\n").unwrap();
        assert_eq!(config.chunking.chunk_size, 512);
        assert_eq!(config.chunking.max_tokens, 16_000);
        assert_eq!(config.retry.backoff_factor, 2.0);
    }
}
