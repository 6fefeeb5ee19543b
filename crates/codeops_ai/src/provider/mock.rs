//! Mock provider with queued replies, for deterministic tests without
//! network access.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::ChatProvider;
use crate::error::ProviderError;
use crate::prompts::PromptPair;

/// One canned outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Error(ProviderError),
}

impl MockReply {
    pub fn text(content: impl Into<String>) -> Self {
        MockReply::Text(content.into())
    }

    pub fn error(error: ProviderError) -> Self {
        MockReply::Error(error)
    }
}

#[derive(Default)]
struct Recorded {
    replies: VecDeque<MockReply>,
    prompts: Vec<PromptPair>,
    models: Vec<Option<String>>,
}

/// Replies are consumed in order. An empty queue is an error, which
/// catches tests that forgot to queue one.
pub struct MockProvider {
    name: String,
    model: String,
    state: Mutex<Recorded>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            state: Mutex::new(Recorded::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn queue(&self, reply: MockReply) {
        self.lock().replies.push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<PromptPair> {
        self.lock().prompts.clone()
    }

    /// Model overrides received, in call order.
    pub fn models_seen(&self) -> Vec<Option<String>> {
        self.lock().models.clone()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        prompts: &PromptPair,
        model: Option<&str>,
    ) -> Result<String, ProviderError> {
        let mut state = self.lock();
        state.prompts.push(prompts.clone());
        state.models.push(model.map(str::to_string));

        match state.replies.pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(e)) => Err(e),
            None => Err(ProviderError::Transport {
                provider: self.name.clone(),
                message: "no mock replies queued".to_string(),
            }),
        }
    }
}
