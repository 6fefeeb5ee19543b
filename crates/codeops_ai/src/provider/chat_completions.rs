use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    ChatProvider, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GATEWAY_BASE_URL,
    GATEWAY_DEFAULT_MODEL, GROQ_BASE_URL, GROQ_DEFAULT_MODEL,
};
use crate::error::ProviderError;
use crate::prompts::PromptPair;

/// Connection settings for one chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub name: String,
    /// API root; `/chat/completions` is appended.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Send the limit as `max_completion_tokens` for every model. Otherwise
    /// only `openai/*` models get it and the rest get `max_tokens`.
    pub completion_tokens_field: bool,
}

impl ProviderSettings {
    /// Groq, the fast code-generation provider.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            name: "Groq".to_string(),
            base_url: GROQ_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: GROQ_DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            completion_tokens_field: true,
        }
    }

    /// The general-purpose gateway.
    pub fn gateway(api_key: impl Into<String>) -> Self {
        Self {
            name: "AI Gateway".to_string(),
            base_url: GATEWAY_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: GATEWAY_DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            completion_tokens_field: false,
        }
    }

    fn uses_completion_tokens(&self, model: &str) -> bool {
        self.completion_tokens_field || model.starts_with("openai/")
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
pub struct ChatCompletionsProvider {
    client: Client,
    settings: ProviderSettings,
}

impl ChatCompletionsProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn build_request<'a>(&'a self, prompts: &'a PromptPair, model: &'a str) -> ChatRequest<'a> {
        let (max_tokens, max_completion_tokens) = if self.settings.uses_completion_tokens(model) {
            (None, Some(self.settings.max_tokens))
        } else {
            (Some(self.settings.max_tokens), None)
        };

        ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompts.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompts.user,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens,
            max_completion_tokens,
        }
    }

    fn transport(&self, e: reqwest::Error) -> ProviderError {
        ProviderError::Transport {
            provider: self.settings.name.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl ChatProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn complete(
        &self,
        prompts: &PromptPair,
        model: Option<&str>,
    ) -> Result<String, ProviderError> {
        let model = model.unwrap_or(&self.settings.model);
        let request = self.build_request(prompts, model);
        tracing::debug!("Calling {} with {}", self.settings.name, model);

        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("{} API error: {} {}", self.settings.name, status, body);
            return Err(match status.as_u16() {
                429 => ProviderError::RateLimited,
                402 => ProviderError::QuotaExhausted,
                code => ProviderError::Http {
                    provider: self.settings.name.clone(),
                    status: code,
                    body,
                },
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| self.transport(e))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse {
                provider: self.settings.name.clone(),
            })
    }
}
