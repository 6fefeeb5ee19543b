use async_trait::async_trait;
use codeops_protocol::RepositoryInfo;
use serde::Deserialize;

use crate::error::FetchError;
use crate::slug::RepoSlug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules: never followed.
    #[serde(other)]
    Other,
}

/// One item of a contents listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentEntry {
    pub fn file(path: &str, download_url: Option<&str>) -> Self {
        Self {
            name: codeops_protocol::file_name(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::File,
            download_url: download_url.map(str::to_string),
        }
    }

    pub fn dir(path: &str) -> Self {
        Self {
            name: codeops_protocol::file_name(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::Dir,
            download_url: None,
        }
    }
}

/// Where repository metadata and contents come from.
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn repository(&self, slug: &RepoSlug) -> Result<RepositoryInfo, FetchError>;

    /// List one directory; `path` is empty for the repository root.
    async fn list(&self, slug: &RepoSlug, path: &str) -> Result<Vec<ContentEntry>, FetchError>;

    /// Raw text of one file entry.
    async fn download(&self, entry: &ContentEntry) -> Result<String, FetchError>;
}
