use async_trait::async_trait;
use codeops_ai::ActionHandler;
use codeops_github::{RepoFetcher, RepoSource};
use codeops_protocol::{ActionRequest, ActionResponse, FetchRepoResponse};

use super::{ActionClient, ClientError, RepositoryClient};

/// Runs both services in process, with the same error messages and status
/// codes the HTTP host would answer with.
pub struct LocalClient<S> {
    fetcher: RepoFetcher<S>,
    actions: ActionHandler,
}

impl<S: RepoSource> LocalClient<S> {
    pub fn new(fetcher: RepoFetcher<S>, actions: ActionHandler) -> Self {
        Self { fetcher, actions }
    }
}

#[async_trait]
impl<S: RepoSource> RepositoryClient for LocalClient<S> {
    async fn fetch_repository(&self, repo_url: &str) -> Result<FetchRepoResponse, ClientError> {
        self.fetcher
            .fetch(repo_url)
            .await
            .map(FetchRepoResponse::from)
            .map_err(|e| ClientError::Rejected {
                status: e.status_code(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl<S: RepoSource> ActionClient for LocalClient<S> {
    async fn run_action(&self, request: ActionRequest) -> Result<ActionResponse, ClientError> {
        self.actions
            .handle(request)
            .await
            .map_err(|e| ClientError::Rejected {
                status: e.status_code(),
                message: e.to_string(),
            })
    }
}
