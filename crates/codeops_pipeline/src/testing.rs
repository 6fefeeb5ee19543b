//! In-memory service doubles for orchestrator tests.

use async_trait::async_trait;
use codeops_protocol::{
    ActionRequest, ActionResponse, FetchRepoResponse, RepoFile, RepositoryInfo,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::client::{ActionClient, ClientError, RepositoryClient};

#[derive(Default)]
pub struct MockRepos {
    outcome: Mutex<Option<Result<FetchRepoResponse, ClientError>>>,
    calls: Mutex<usize>,
}

impl MockRepos {
    pub fn succeed_with(&self, repository: RepositoryInfo, files: Vec<RepoFile>) {
        *self.outcome.lock().unwrap() = Some(Ok(FetchRepoResponse::new(repository, files)));
    }

    pub fn fail_with(&self, status: u16, message: &str) {
        *self.outcome.lock().unwrap() = Some(Err(ClientError::Rejected {
            status,
            message: message.to_string(),
        }));
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl RepositoryClient for MockRepos {
    async fn fetch_repository(&self, _repo_url: &str) -> Result<FetchRepoResponse, ClientError> {
        *self.calls.lock().unwrap() += 1;
        self.outcome
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ClientError::Transport("no fetch outcome queued".into())))
    }
}

/// Answers actions from a queue. With [`MockActions::hold`], each call
/// waits for the returned gate before answering.
#[derive(Default)]
pub struct MockActions {
    replies: Mutex<VecDeque<Result<Value, ClientError>>>,
    requests: Mutex<Vec<ActionRequest>>,
    gate: Mutex<Option<Arc<Notify>>>,
    arrived: Notify,
}

impl MockActions {
    pub fn reply(&self, result: Value) {
        self.replies.lock().unwrap().push_back(Ok(result));
    }

    pub fn fail(&self, status: u16, message: &str) {
        self.replies.lock().unwrap().push_back(Err(ClientError::Rejected {
            status,
            message: message.to_string(),
        }));
    }

    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn requests(&self) -> Vec<ActionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let arrived = self.arrived.notified();
            if self.calls() >= n {
                return;
            }
            arrived.await;
        }
    }
}

#[async_trait]
impl ActionClient for MockActions {
    async fn run_action(&self, request: ActionRequest) -> Result<ActionResponse, ClientError> {
        let action = request.action;
        self.requests.lock().unwrap().push(request);
        self.arrived.notify_waiters();

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("no action reply queued".into())));
        reply.map(|result| ActionResponse::new(action, result, "mock-model"))
    }
}
