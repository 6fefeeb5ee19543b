//! JSON envelopes of the Repository Fetch and AI Action services.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::{Action, ModelChoice};
use crate::files::RepoFile;
use crate::types::RepositoryInfo;

// ============================================================================
// Repository Fetch service
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRepoRequest {
    #[serde(default)]
    pub repo_url: String,
}

impl FetchRepoRequest {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRepoResponse {
    pub success: bool,
    pub repository: RepositoryInfo,
    pub files: Vec<RepoFile>,
    pub total_files: usize,
}

impl FetchRepoResponse {
    pub fn new(repository: RepositoryInfo, files: Vec<RepoFile>) -> Self {
        Self {
            success: true,
            repository,
            total_files: files.len(),
            files,
        }
    }
}

/// Error body returned by both services alongside a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ============================================================================
// AI Action service
// ============================================================================

/// A file as sent to the AI Action service. Only path and content travel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFile {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

impl From<&RepoFile> for ActionFile {
    fn from(file: &RepoFile) -> Self {
        Self {
            path: file.path.clone(),
            content: file.content.clone(),
        }
    }
}

impl From<RepoFile> for ActionFile {
    fn from(file: RepoFile) -> Self {
        Self {
            path: file.path,
            content: file.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    #[serde(default)]
    pub files: Vec<ActionFile>,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_context: Option<String>,
}

impl ActionRequest {
    pub fn new(action: Action, files: impl IntoIterator<Item = ActionFile>) -> Self {
        Self {
            files: files.into_iter().collect(),
            action,
            model: None,
            issue_context: None,
        }
    }

    pub fn with_model(mut self, model: ModelChoice) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_issue_context(mut self, context: impl Into<String>) -> Self {
        self.issue_context = Some(context.into());
        self
    }
}

/// Successful AI Action response.
///
/// `result` is the parsed JSON object of the action's shape, or
/// `{"rawResponse": text}` when the model's reply was not valid JSON.
/// `model` names the provider and model that actually answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub action: Action,
    pub result: Value,
    #[serde(default)]
    pub model: String,
}

impl ActionResponse {
    pub fn new(action: Action, result: Value, model: impl Into<String>) -> Self {
        Self {
            success: true,
            action,
            result,
            model: model.into(),
        }
    }

    /// The raw model text, when JSON parsing fell back.
    pub fn raw_response(&self) -> Option<&str> {
        self.result.get("rawResponse").and_then(Value::as_str)
    }
}
