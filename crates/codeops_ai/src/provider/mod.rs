//! Upstream LLM providers.
//!
//! Every provider speaks the OpenAI-compatible chat-completions protocol;
//! they differ only in endpoint, secret, default model and which token-limit
//! field they accept. The [`ProviderRouter`] orders them per action.

mod chat_completions;
pub mod mock;
mod router;

pub use chat_completions::{ChatCompletionsProvider, ProviderSettings};
pub use router::{Completion, ProviderRouter};

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::prompts::PromptPair;

/// Groq's OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_DEFAULT_MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";
/// OpenAI-compatible AI gateway.
pub const GATEWAY_BASE_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const GATEWAY_DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// One upstream chat model.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Display name used in logs and the response's `model` label.
    fn name(&self) -> &str;

    /// Model used when the request names none.
    fn model(&self) -> &str;

    /// Send one system + user prompt and return the reply text.
    ///
    /// `model` overrides [`ChatProvider::model`] for this call.
    async fn complete(
        &self,
        prompts: &PromptPair,
        model: Option<&str>,
    ) -> Result<String, ProviderError>;
}
