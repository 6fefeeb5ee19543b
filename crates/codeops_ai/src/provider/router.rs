use codeops_protocol::{Action, ModelChoice};
use std::sync::Arc;

use super::ChatProvider;
use crate::error::{ActionError, ProviderError};
use crate::prompts::PromptPair;

/// A reply together with the label of the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Primary,
    General,
    Fallback,
}

/// Ordered provider strategies.
///
/// Code-generation actions try the primary provider first and fall back to
/// the general provider; other actions use the general provider only. A
/// provider whose secret is not configured is simply absent.
#[derive(Clone, Default)]
pub struct ProviderRouter {
    primary: Option<Arc<dyn ChatProvider>>,
    general: Option<Arc<dyn ChatProvider>>,
}

impl ProviderRouter {
    pub fn new(
        primary: Option<Arc<dyn ChatProvider>>,
        general: Option<Arc<dyn ChatProvider>>,
    ) -> Self {
        Self { primary, general }
    }

    pub fn has_providers(&self) -> bool {
        self.primary.is_some() || self.general.is_some()
    }

    /// A custom model id is a general-provider model and bypasses the
    /// primary; the named choices keep the default routing.
    fn chain(&self, action: Action, model: &ModelChoice) -> Vec<(Arc<dyn ChatProvider>, Slot)> {
        let mut chain = Vec::with_capacity(2);
        let wants_primary = action.prefers_primary() && model.provider_model().is_none();

        if wants_primary {
            if let Some(primary) = &self.primary {
                chain.push((primary.clone(), Slot::Primary));
            }
        }
        if let Some(general) = &self.general {
            let slot = if chain.is_empty() {
                Slot::General
            } else {
                Slot::Fallback
            };
            chain.push((general.clone(), slot));
        }
        chain
    }

    /// Try each provider in order until one answers.
    ///
    /// When every provider fails the last provider's error is returned, so
    /// rate-limit and quota messages from the final fallback reach the caller.
    pub async fn complete(
        &self,
        action: Action,
        prompts: &PromptPair,
        model: &ModelChoice,
    ) -> Result<Completion, ActionError> {
        let chain = self.chain(action, model);
        let mut last_error: Option<ProviderError> = None;

        for (provider, slot) in chain {
            let override_model = match slot {
                Slot::Primary => None,
                Slot::General | Slot::Fallback => model.provider_model(),
            };
            let model_id = override_model.unwrap_or(provider.model()).to_string();

            match provider.complete(prompts, override_model).await {
                Ok(text) => {
                    let label = match slot {
                        Slot::Primary => format!("{} ({})", model_id, provider.name()),
                        Slot::General => model_id,
                        Slot::Fallback => format!("{} (fallback)", model_id),
                    };
                    tracing::info!("Completed {} with {}", action, label);
                    return Ok(Completion { text, model: label });
                }
                Err(e) => {
                    tracing::warn!("{} failed for {}: {}", provider.name(), action, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map_or(ActionError::NoProviders, ActionError::Provider))
    }
}
