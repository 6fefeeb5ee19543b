//! Service host tests against the axum router.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use codeops::server;
use codeops_ai::provider::mock::{MockProvider, MockReply};
use codeops_ai::{ActionHandler, ChatProvider, ProviderError, ProviderRouter};
use codeops_github::{GitHubClient, RepoFetcher};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(github: &MockServer, router: ProviderRouter) -> Router {
    server::router(
        RepoFetcher::new(GitHubClient::with_api_base(github.uri())),
        ActionHandler::new(router),
    )
}

fn general(provider: &Arc<MockProvider>) -> ProviderRouter {
    ProviderRouter::new(None, Some(provider.clone() as Arc<dyn ChatProvider>))
}

async fn post(app: Router, uri: &str, body: Body) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post(app, uri, Body::from(body.to_string())).await
}

#[tokio::test]
async fn test_health() {
    let github = MockServer::start().await;
    let response = app(&github, ProviderRouter::default())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_fetch_input_errors() {
    let github = MockServer::start().await;

    let (status, body) = post_json(
        app(&github, ProviderRouter::default()),
        "/fetch-github-repo",
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Repository URL is required");

    let (status, body) = post_json(
        app(&github, ProviderRouter::default()),
        "/fetch-github-repo",
        json!({"repoUrl": "https://gitlab.com/a/b"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid GitHub URL format");

    let (status, _) = post(
        app(&github, ProviderRouter::default()),
        "/fetch-github-repo",
        Body::from("not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing reached GitHub.
    assert!(github.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_unknown_repository() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&github)
        .await;

    let (status, body) = post_json(
        app(&github, ProviderRouter::default()),
        "/fetch-github-repo",
        json!({"repoUrl": "https://github.com/octo/gone"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "Repository not found or not accessible: octo/gone"
    );
}

#[tokio::test]
async fn test_fetch_repository() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "hello",
            "full_name": "octo/hello",
            "description": "Greeter",
            "language": "TypeScript",
            "stargazers_count": 7,
            "default_branch": "main"
        })))
        .mount(&github)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "index.ts", "path": "index.ts", "type": "file",
             "download_url": format!("{}/raw/index.ts", github.uri())},
            {"name": "logo.png", "path": "logo.png", "type": "file",
             "download_url": format!("{}/raw/logo.png", github.uri())}
        ])))
        .mount(&github)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/index.ts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("export const hi = 1;"))
        .mount(&github)
        .await;

    let (status, body) = post_json(
        app(&github, ProviderRouter::default()),
        "/fetch-github-repo",
        json!({"repoUrl": "https://github.com/octo/hello.git"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["repository"]["fullName"], "octo/hello");
    assert_eq!(body["repository"]["stars"], 7);
    assert_eq!(body["totalFiles"], 1);
    assert_eq!(body["files"][0]["path"], "index.ts");
    assert_eq!(body["files"][0]["content"], "export const hi = 1;");
}

#[tokio::test]
async fn test_action_validation() {
    let github = MockServer::start().await;

    let (status, body) = post_json(
        app(&github, ProviderRouter::default()),
        "/analyze-code",
        json!({"files": [], "action": "analyze"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Files array is required");

    let (status, body) = post_json(
        app(&github, ProviderRouter::default()),
        "/analyze-code",
        json!({"files": [{"path": "a.ts", "content": "x"}], "action": "explode"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid action");
}

#[tokio::test]
async fn test_action_without_providers() {
    let github = MockServer::start().await;
    let (status, body) = post_json(
        app(&github, ProviderRouter::default()),
        "/analyze-code",
        json!({"files": [{"path": "a.ts", "content": "x"}], "action": "analyze"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "No AI API key configured or all AI calls failed"
    );
}

#[tokio::test]
async fn test_action_success() {
    let github = MockServer::start().await;
    let provider = Arc::new(MockProvider::new("AI Gateway", "google/gemini-2.5-flash"));
    provider.queue(MockReply::text(
        "Here you go:\n```json\n{\"summary\": \"clean\", \"issues\": [], \"metrics\": {\"totalIssues\": 0}}\n```",
    ));

    let (status, body) = post_json(
        app(&github, general(&provider)),
        "/analyze-code",
        json!({
            "files": [{"path": "a.ts", "content": "const a = 1;"}],
            "action": "analyze",
            "model": "gemini"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["action"], "analyze");
    assert_eq!(body["model"], "google/gemini-2.5-flash");
    assert_eq!(body["result"]["summary"], "clean");
    assert!(provider.prompts()[0].user.contains("--- a.ts ---"));
}

#[tokio::test]
async fn test_rate_limit_message() {
    let github = MockServer::start().await;
    let provider = Arc::new(MockProvider::new("AI Gateway", "gemini"));
    provider.queue(MockReply::error(ProviderError::RateLimited));

    let (status, body) = post_json(
        app(&github, general(&provider)),
        "/analyze-code",
        json!({"files": [{"path": "a.ts", "content": "x"}], "action": "measure"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");
}

#[tokio::test]
async fn test_cors_is_permissive() {
    let github = MockServer::start().await;
    let response = app(&github, ProviderRouter::default())
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
