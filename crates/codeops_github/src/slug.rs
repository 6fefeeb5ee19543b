use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::FetchError;

/// `owner/repo` extracted from a GitHub URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

static GITHUB_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/([^/\s]+)/([^/\s]+)").unwrap());

impl RepoSlug {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse `github.com/<owner>/<repo>` out of a URL.
    ///
    /// Anything after the repo segment (`/tree/main`, query, fragment) is
    /// ignored and a trailing `.git` is stripped.
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::MissingUrl);
        }

        let caps = GITHUB_PATH
            .captures(url)
            .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

        let owner = &caps[1];
        let repo = caps[2]
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches(".git");

        if owner.is_empty() || repo.is_empty() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        Ok(Self::new(owner, repo))
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
