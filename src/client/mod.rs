//! HTTP client for the remote embedding and chat-completion endpoints.
//!
//! The pipelines talk to the endpoints through the [`EmbeddingBackend`] and
//! [`ChatBackend`] traits so tests can inject fakes; [`MistralClient`] is
//! the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{RagError, classify_remote};
use crate::models::ApiConfig;

/// A remote endpoint that embeds a list of input strings, returning one
/// fixed-length vector per input, in input order.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError>;
}

/// A role-tagged chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A remote endpoint that completes a chat conversation with a single
/// textual response.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, RagError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Client for a Mistral-style HTTP API.
#[derive(Debug, Clone)]
pub struct MistralClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MistralClient {
    pub fn new(config: &ApiConfig, api_key: String) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Result<HeaderMap, RagError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| RagError::InvalidArgument("invalid API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Surface a non-success response body as a classified error. The body
    /// text is what carries the rate-limit / oversized-batch markers.
    async fn classify_response(response: reqwest::Response) -> Result<reqwest::Response, RagError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_remote(&format!("status {status}: {body}")))
    }
}

#[async_trait]
impl EmbeddingBackend for MistralClient {
    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let request = EmbeddingsRequest {
            model,
            input: inputs,
        };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;
        let response = Self::classify_response(response).await?;

        let mut parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| RagError::EmbeddingFetchFailed(e.to_string()))?;

        // The API reports each vector's input position; reassemble in
        // submission order before handing back.
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl ChatBackend for MistralClient {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, RagError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest { model, messages };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;
        let response = Self::classify_response(response).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagError::Unexpected(format!("malformed chat response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| RagError::Unexpected("chat response had no choices".to_string()))
    }
}
