use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use ragpipe::client::MistralClient;
use ragpipe::models::Config;
use ragpipe::services::{
    CompletionPipeline, EmbeddingParams, EmbeddingPipeline, FlatIndex, build_prompt, chunk_text,
};
use ragpipe::sources::fetch_document;
use ragpipe::utils::retry::RetryPolicy;

const QUESTION: &str = "What were the two main things the author worked on before college?";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().unwrap_or_default();
    let api_key = config
        .api_key()
        .context("API key not found in environment variables")?;

    let client = MistralClient::new(&config.api, api_key).context("failed to build API client")?;
    let policy = RetryPolicy::from_config(&config.retry).context("invalid retry configuration")?;

    // Fetch the source document and persist it locally.
    let fetch_client = reqwest::Client::new();
    let text = fetch_document(
        &fetch_client,
        &config.document.url,
        Path::new(&config.document.save_path),
    )
    .await
    .context("failed to fetch source document")?;

    let chunks = chunk_text(&text, config.chunking.chunk_size)?;
    println!("Number of chunks: {}", chunks.len());

    // Embed every chunk in token-budgeted batches.
    let params = EmbeddingParams::new(&config.api.embed_model, &config.chunking);
    let embedder = EmbeddingPipeline::new(client.clone(), params, policy.clone());
    let embeddings = embedder
        .embed_chunks(&chunks)
        .await
        .context("failed to fetch text embeddings")?;

    // Index and retrieve.
    let dim = embeddings
        .first()
        .map(Vec::len)
        .context("failed to fetch text embeddings")?;
    let mut index = FlatIndex::new(dim);
    index.add(embeddings)?;

    println!("{} {QUESTION}", style("Query:").bold());
    let question_embedding = embedder
        .embed_query(QUESTION)
        .await
        .context("failed to embed the question")?;
    let (_scores, ids) = index.search(&question_embedding, config.search.top_k)?;
    let retrieved: Vec<&str> = ids.iter().map(|&id| chunks[id].text.as_str()).collect();

    // Synthesize the answer from the retrieved context.
    let prompt = build_prompt(&retrieved, QUESTION);
    let completer = CompletionPipeline::new(client, &config.api.chat_model, policy);
    let answer = completer.answer(&prompt).await;

    println!("{} {answer}", style("Answer:").bold());
    Ok(())
}
