//! The two service boundaries the orchestrator talks to.
//!
//! [`HttpClient`] reaches hosted services over HTTP; [`LocalClient`] runs
//! the same service logic in process.

mod http;
mod local;

pub use http::HttpClient;
pub use local::LocalClient;

use async_trait::async_trait;
use codeops_protocol::{ActionRequest, ActionResponse, FetchRepoResponse};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The service answered with an error status and message
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Service request failed: {0}")]
    Transport(String),

    /// 2xx with a body that is not the expected envelope
    #[error("Invalid service response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Repository Fetch service.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    async fn fetch_repository(&self, repo_url: &str) -> Result<FetchRepoResponse, ClientError>;
}

/// AI Action service.
#[async_trait]
pub trait ActionClient: Send + Sync {
    async fn run_action(&self, request: ActionRequest) -> Result<ActionResponse, ClientError>;
}
