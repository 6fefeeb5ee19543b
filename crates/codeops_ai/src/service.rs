use chrono::Utc;
use codeops_protocol::{Action, ActionFile, ActionRequest, ActionResponse, ModelChoice};
use serde::Deserialize;
use serde_json::Value;

use crate::context::files_context;
use crate::error::ActionError;
use crate::parse::extract_json;
use crate::prompts::build_prompts;
use crate::provider::ProviderRouter;

/// Request body before validation. Field checks happen in a fixed order so
/// that a missing file list wins over a bad action name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UncheckedRequest {
    #[serde(default)]
    files: Value,
    #[serde(default)]
    action: Value,
    #[serde(default)]
    model: Option<ModelChoice>,
    #[serde(default)]
    issue_context: Option<String>,
}

/// The AI Action service.
#[derive(Clone, Default)]
pub struct ActionHandler {
    router: ProviderRouter,
}

impl ActionHandler {
    pub fn new(router: ProviderRouter) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &ProviderRouter {
        &self.router
    }

    pub async fn handle(&self, request: ActionRequest) -> Result<ActionResponse, ActionError> {
        if request.files.is_empty() {
            return Err(ActionError::MissingFiles);
        }

        let action = request.action;
        let context = files_context(&request.files);
        let prompts = build_prompts(
            action,
            &context,
            request.issue_context.as_deref(),
            Utc::now(),
        );
        let model = request.model.unwrap_or_default();

        let completion = self.router.complete(action, &prompts, &model).await?;
        let result = extract_json(&completion.text);

        Ok(ActionResponse::new(action, result, completion.model))
    }

    /// Validate a raw JSON body, then [`handle`](Self::handle) it.
    pub async fn handle_json(&self, body: Value) -> Result<ActionResponse, ActionError> {
        let unchecked: UncheckedRequest =
            serde_json::from_value(body).map_err(|e| ActionError::Malformed(e.to_string()))?;

        let files = match unchecked.files {
            Value::Array(items) if !items.is_empty() => {
                serde_json::from_value::<Vec<ActionFile>>(Value::Array(items))
                    .map_err(|e| ActionError::Malformed(e.to_string()))?
            }
            _ => return Err(ActionError::MissingFiles),
        };

        let action = match &unchecked.action {
            Value::String(name) => name
                .parse::<Action>()
                .map_err(|_| ActionError::InvalidAction(name.clone()))?,
            other => return Err(ActionError::InvalidAction(other.to_string())),
        };

        let mut request = ActionRequest::new(action, files);
        request.model = unchecked.model;
        request.issue_context = unchecked.issue_context;

        self.handle(request).await
    }
}
