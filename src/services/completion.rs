//! Best-effort chat completion.
//!
//! The completion path never aborts the chat turn: an oversized prompt or
//! an exhausted retry budget degrades to a canned apology instead of an
//! error. Failures are still reported on stderr for the operator.

use crate::client::{ChatBackend, ChatMessage};
use crate::error::RagError;
use crate::utils::retry::{RetryPolicy, with_retry};

pub const APOLOGY_PROMPT_TOO_LONG: &str = "Sorry, the prompt is too long for processing.";
pub const APOLOGY_GENERIC: &str = "Sorry, I couldn't process your request at this time.";

/// Retry-wrapped, apology-degraded chat completion.
pub struct CompletionPipeline<C> {
    backend: C,
    model: String,
    policy: RetryPolicy,
}

impl<C: ChatBackend> CompletionPipeline<C> {
    pub fn new(backend: C, model: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            model: model.into(),
            policy,
        }
    }

    /// Send the prompt as a single user message and return the model's
    /// response, or an apology string if the call cannot be completed.
    pub async fn answer(&self, prompt: &str) -> String {
        let messages = [ChatMessage::user(prompt)];
        let result = with_retry(&self.policy, || {
            self.backend.complete(&self.model, &messages)
        })
        .await;

        match result {
            Ok(text) => text,
            Err(RagError::PayloadTooLarge(_)) => {
                // Nothing to subdivide; the prompt is a single unit.
                eprintln!("chat prompt too long; consider reducing the context size");
                APOLOGY_PROMPT_TOO_LONG.to_string()
            }
            Err(err) => {
                eprintln!("chat completion failed: {err}");
                APOLOGY_GENERIC.to_string()
            }
        }
    }
}

/// Build the answer-synthesis prompt from retrieved context and the query.
pub fn build_prompt(context_chunks: &[&str], question: &str) -> String {
    let context = context_chunks.join("\n\n");
    format!(
        "Context information is below.\n\
         ---------------------\n\
         {context}\n\
         ---------------------\n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {question}\n\
         Answer:\n"
    )
}
