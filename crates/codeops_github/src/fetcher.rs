use codeops_protocol::{FetchRepoResponse, RepoFile, RepositoryInfo};
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::FetchError;
use crate::limits::FetchLimits;
use crate::slug::RepoSlug;
use crate::source::{ContentEntry, EntryKind, RepoSource};

/// Metadata plus the collected file snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRepository {
    pub repository: RepositoryInfo,
    pub files: Vec<RepoFile>,
}

impl From<FetchedRepository> for FetchRepoResponse {
    fn from(fetched: FetchedRepository) -> Self {
        FetchRepoResponse::new(fetched.repository, fetched.files)
    }
}

/// Walks a repository through a [`RepoSource`] under [`FetchLimits`].
pub struct RepoFetcher<S> {
    source: S,
    limits: FetchLimits,
}

impl<S: RepoSource> RepoFetcher<S> {
    pub fn new(source: S) -> Self {
        Self::with_limits(source, FetchLimits::default())
    }

    pub fn with_limits(source: S, limits: FetchLimits) -> Self {
        Self { source, limits }
    }

    pub fn limits(&self) -> &FetchLimits {
        &self.limits
    }

    pub async fn fetch(&self, repo_url: &str) -> Result<FetchedRepository, FetchError> {
        let slug = RepoSlug::parse(repo_url)?;
        tracing::info!("Fetching repository {}", slug);

        let repository = self.source.repository(&slug).await?;

        let mut files = Vec::new();
        self.walk(&slug, String::new(), &mut files).await?;

        tracing::info!("Collected {} files from {}", files.len(), slug);
        Ok(FetchedRepository { repository, files })
    }

    /// Depth-first, in listing order. Listing failures abort the fetch;
    /// download failures only drop the file.
    fn walk<'a>(
        &'a self,
        slug: &'a RepoSlug,
        path: String,
        files: &'a mut Vec<RepoFile>,
    ) -> BoxFuture<'a, Result<(), FetchError>> {
        async move {
            let entries = self.source.list(slug, &path).await?;

            for entry in entries {
                if files.len() >= self.limits.max_files {
                    break;
                }
                match entry.kind {
                    EntryKind::File => {
                        if let Some(file) = self.collect(&entry).await {
                            files.push(file);
                        }
                    }
                    EntryKind::Dir if self.limits.should_descend(&entry.name) => {
                        self.walk(slug, entry.path.clone(), files).await?;
                    }
                    _ => {}
                }
            }

            Ok(())
        }
        .boxed()
    }

    async fn collect(&self, entry: &ContentEntry) -> Option<RepoFile> {
        if entry.download_url.is_none() || !self.limits.is_eligible(&entry.name) {
            return None;
        }

        match self.source.download(entry).await {
            Ok(content) => Some(RepoFile {
                path: entry.path.clone(),
                name: entry.name.clone(),
                content: self.limits.truncate(content),
            }),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", entry.path, e);
                None
            }
        }
    }
}
