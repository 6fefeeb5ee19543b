use async_trait::async_trait;
use codeops_protocol::RepositoryInfo;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::FetchError;
use crate::slug::RepoSlug;
use crate::source::{ContentEntry, RepoSource};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const USER_AGENT: &str = "CodeOps-AI";
const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

/// Repository metadata as returned by `GET /repos/{owner}/{repo}`.
#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    default_branch: String,
}

impl From<GitHubRepo> for RepositoryInfo {
    fn from(repo: GitHubRepo) -> Self {
        RepositoryInfo {
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description,
            language: repo.language,
            stars: repo.stargazers_count,
            default_branch: repo.default_branch,
        }
    }
}

/// GitHub REST API client.
///
/// Unauthenticated by default; a token raises the rate limit and gives
/// access to private repositories.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Point the client at another API root (GitHub Enterprise, tests).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_V3_JSON));
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    fn contents_url(&self, slug: &RepoSlug, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            format!("{}/repos/{}/{}/contents", self.api_base, slug.owner, slug.repo)
        } else {
            format!(
                "{}/repos/{}/{}/contents/{}",
                self.api_base, slug.owner, slug.repo, path
            )
        }
    }
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn repository(&self, slug: &RepoSlug) -> Result<RepositoryInfo, FetchError> {
        let url = format!("{}/repos/{}/{}", self.api_base, slug.owner, slug.repo);
        tracing::debug!("Fetching repository metadata from {}", url);

        let response = self.http.get(&url).headers(self.headers()).send().await?;
        if !response.status().is_success() {
            tracing::warn!(
                "Repository lookup for {} returned {}",
                slug,
                response.status()
            );
            return Err(FetchError::RepositoryNotFound {
                owner: slug.owner.clone(),
                repo: slug.repo.clone(),
            });
        }

        let repo: GitHubRepo = response.json().await?;
        Ok(repo.into())
    }

    async fn list(&self, slug: &RepoSlug, path: &str) -> Result<Vec<ContentEntry>, FetchError> {
        let url = self.contents_url(slug, path);
        let response = self.http.get(&url).headers(self.headers()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                reason: reason(status),
            });
        }

        Ok(response.json().await?)
    }

    async fn download(&self, entry: &ContentEntry) -> Result<String, FetchError> {
        let url = entry.download_url.as_deref().ok_or_else(|| FetchError::Download {
            path: entry.path.clone(),
            message: "no download URL".to_string(),
        })?;

        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| FetchError::Download {
            path: entry.path.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Download {
                path: entry.path.clone(),
                message: format!("{} {}", status.as_u16(), reason(status)),
            });
        }

        response.text().await.map_err(|e| FetchError::Download {
            path: entry.path.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_repository_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/hello"))
            .and(header("accept", GITHUB_V3_JSON))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "hello",
                "full_name": "octo/hello",
                "description": null,
                "language": "Rust",
                "stargazers_count": 42,
                "default_branch": "main",
                "forks": 3
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::with_api_base(server.uri());
        let info = client
            .repository(&RepoSlug::new("octo", "hello"))
            .await
            .unwrap();

        assert_eq!(info.full_name, "octo/hello");
        assert_eq!(info.stars, 42);
        assert_eq!(info.language.as_deref(), Some("Rust"));
        assert_eq!(info.description, None);
    }

    #[tokio::test]
    async fn test_missing_repository_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let client = GitHubClient::with_api_base(server.uri());
        let err = client
            .repository(&RepoSlug::new("octo", "gone"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Repository not found or not accessible: octo/gone"
        );
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_listing_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/hello/contents"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = GitHubClient::with_api_base(server.uri());
        let err = client
            .list(&RepoSlug::new("octo", "hello"), "")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "GitHub API error: 403 Forbidden");
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_listing_and_download() {
        let server = MockServer::start().await;
        let raw = format!("{}/raw/src/lib.rs", server.uri());
        Mock::given(method("GET"))
            .and(path("/repos/octo/hello/contents/src"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "lib.rs", "path": "src/lib.rs", "type": "file", "download_url": raw},
                {"name": "bin", "path": "src/bin", "type": "dir", "download_url": null},
                {"name": "link", "path": "src/link", "type": "symlink"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/src/lib.rs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pub fn hi() {}"))
            .mount(&server)
            .await;

        let client = GitHubClient::with_api_base(server.uri());
        let entries = client
            .list(&RepoSlug::new("octo", "hello"), "src")
            .await
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].kind, crate::EntryKind::Dir);
        assert_eq!(entries[2].kind, crate::EntryKind::Other);

        let body = client.download(&entries[0]).await.unwrap();
        assert_eq!(body, "pub fn hi() {}");
    }

    #[test]
    fn test_token_sets_authorization() {
        let client = GitHubClient::new().with_token(Some("abc".into()));
        assert_eq!(
            client.headers().get(AUTHORIZATION).unwrap(),
            "Bearer abc"
        );
        let anonymous = GitHubClient::new().with_token(Some("  ".into()));
        assert!(anonymous.headers().get(AUTHORIZATION).is_none());
    }
}
