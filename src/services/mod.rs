mod batch;
mod chunker;
mod completion;
mod embedding;
mod vector_store;

pub use batch::{estimate_tokens, plan_batches};
pub use chunker::chunk_text;
pub use completion::{
    APOLOGY_GENERIC, APOLOGY_PROMPT_TOO_LONG, CompletionPipeline, build_prompt,
};
pub use embedding::{EmbeddingParams, EmbeddingPipeline};
pub use vector_store::FlatIndex;
