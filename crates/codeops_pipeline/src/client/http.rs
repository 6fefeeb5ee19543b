use async_trait::async_trait;
use codeops_protocol::{
    ActionRequest, ActionResponse, ErrorBody, FetchRepoRequest, FetchRepoResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ActionClient, ClientError, RepositoryClient};

pub const FETCH_PATH: &str = "fetch-github-repo";
pub const ACTION_PATH: &str = "analyze-code";

/// Client for services hosted at `base_url` (`codeops serve` or any host
/// exposing the same two endpoints).
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Bearer token sent with every request.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut request = self.http.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("{} request failed with status {}", endpoint, status));
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RepositoryClient for HttpClient {
    async fn fetch_repository(&self, repo_url: &str) -> Result<FetchRepoResponse, ClientError> {
        let response: FetchRepoResponse = self
            .post(FETCH_PATH, &FetchRepoRequest::new(repo_url))
            .await?;
        if !response.success {
            return Err(ClientError::Decode(
                "Failed to fetch repository".to_string(),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl ActionClient for HttpClient {
    async fn run_action(&self, request: ActionRequest) -> Result<ActionResponse, ClientError> {
        let action = request.action;
        let response: ActionResponse = self.post(ACTION_PATH, &request).await?;
        if !response.success {
            return Err(ClientError::Decode(format!("{} failed", action)));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeops_protocol::{Action, ActionFile};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_repository() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fetch-github-repo"))
            .and(body_json(json!({"repoUrl": "https://github.com/o/r"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "repository": {"name": "r", "fullName": "o/r", "description": null,
                               "language": "Rust", "stars": 1, "defaultBranch": "main"},
                "files": [{"path": "src/lib.rs", "name": "lib.rs", "content": ""}],
                "totalFiles": 1
            })))
            .mount(&server)
            .await;

        let client = HttpClient::new(format!("{}/", server.uri()));
        let response = client
            .fetch_repository("https://github.com/o/r")
            .await
            .unwrap();
        assert_eq!(response.repository.full_name, "o/r");
        assert_eq!(response.total_files, 1);
    }

    #[tokio::test]
    async fn test_error_body_becomes_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fetch-github-repo"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "Repository not found or not accessible: o/gone"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/analyze-code"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = HttpClient::new(server.uri());
        let err = client.fetch_repository("github.com/o/gone").await.unwrap_err();
        assert_eq!(err.to_string(), "Repository not found or not accessible: o/gone");
        assert_eq!(err.status(), Some(404));

        let request = ActionRequest::new(
            Action::Analyze,
            [ActionFile {
                path: "a".into(),
                content: "b".into(),
            }],
        );
        let err = client.run_action(request).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("analyze-code"));
    }

    #[tokio::test]
    async fn test_api_key_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-code"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "action": "test", "result": {}, "model": "m"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = ActionRequest::new(
            Action::Test,
            [ActionFile {
                path: "a.ts".into(),
                content: "x".into(),
            }],
        );
        let client = HttpClient::new(server.uri()).with_api_key(Some("anon-key".into()));
        client.run_action(request.clone()).await.unwrap();

        // A blank key is never sent.
        let client = HttpClient::new(server.uri()).with_api_key(Some("  ".into()));
        assert_eq!(client.run_action(request).await.unwrap_err().status(), Some(404));
    }

    #[tokio::test]
    async fn test_run_action_sends_camel_case() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-code"))
            .and(body_json(json!({
                "files": [{"path": "a.ts", "content": "x"}],
                "action": "fix",
                "model": "claude",
                "issueContext": "- bug"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "action": "fix", "result": {"summary": "ok"}, "model": "m"
            })))
            .mount(&server)
            .await;

        let request = ActionRequest::new(
            Action::Fix,
            [ActionFile {
                path: "a.ts".into(),
                content: "x".into(),
            }],
        )
        .with_model("claude".into())
        .with_issue_context("- bug");

        let response = HttpClient::new(server.uri())
            .run_action(request)
            .await
            .unwrap();
        assert_eq!(response.result["summary"], "ok");
    }
}
