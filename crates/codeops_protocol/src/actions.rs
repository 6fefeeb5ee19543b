//! AI action identifiers and model selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One kind of request to the AI Action service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Analyze,
    Fix,
    Test,
    Measure,
    Record,
    Approve,
    Chat,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Analyze,
        Action::Fix,
        Action::Test,
        Action::Measure,
        Action::Record,
        Action::Approve,
        Action::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Analyze => "analyze",
            Action::Fix => "fix",
            Action::Test => "test",
            Action::Measure => "measure",
            Action::Record => "record",
            Action::Approve => "approve",
            Action::Chat => "chat",
        }
    }

    /// Code-generation actions are routed to the primary provider first.
    pub fn prefers_primary(&self) -> bool {
        matches!(self, Action::Fix | Action::Approve | Action::Chat)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid action: {0}")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

/// Model hint sent with an action.
///
/// The dashboard offers two named choices; anything else is passed through as
/// a provider-specific model id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelChoice {
    #[default]
    Gemini,
    Claude,
    Custom(String),
}

impl ModelChoice {
    pub fn as_str(&self) -> &str {
        match self {
            ModelChoice::Gemini => "gemini",
            ModelChoice::Claude => "claude",
            ModelChoice::Custom(id) => id,
        }
    }

    /// Human-readable name used in pipeline log messages.
    pub fn label(&self) -> &str {
        match self {
            ModelChoice::Gemini => "Gemini",
            ModelChoice::Claude => "Claude",
            ModelChoice::Custom(id) => id,
        }
    }

    /// A provider-specific model id, if this is not one of the named choices.
    pub fn provider_model(&self) -> Option<&str> {
        match self {
            ModelChoice::Custom(id) => Some(id),
            _ => None,
        }
    }
}

impl From<String> for ModelChoice {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => ModelChoice::Gemini,
            "claude" => ModelChoice::Claude,
            _ => ModelChoice::Custom(value.trim().to_string()),
        }
    }
}

impl From<&str> for ModelChoice {
    fn from(value: &str) -> Self {
        ModelChoice::from(value.to_string())
    }
}

impl From<ModelChoice> for String {
    fn from(value: ModelChoice) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for ModelChoice {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ModelChoice::from(s))
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        assert_eq!(serde_json::to_string(&Action::Analyze).unwrap(), "\"analyze\"");
        assert_eq!("approve".parse::<Action>().unwrap(), Action::Approve);
        assert!("deploy".parse::<Action>().is_err());
    }

    #[test]
    fn test_primary_routing_actions() {
        let primary: Vec<Action> = Action::ALL
            .into_iter()
            .filter(Action::prefers_primary)
            .collect();
        assert_eq!(primary, [Action::Fix, Action::Approve, Action::Chat]);
    }

    #[test]
    fn test_model_choice_parsing() {
        assert_eq!(ModelChoice::from("Claude"), ModelChoice::Claude);
        assert_eq!(ModelChoice::from("gemini"), ModelChoice::Gemini);

        let custom = ModelChoice::from("openai/gpt-5-mini");
        assert_eq!(custom.provider_model(), Some("openai/gpt-5-mini"));
        assert_eq!(
            serde_json::to_string(&custom).unwrap(),
            "\"openai/gpt-5-mini\""
        );
    }
}
