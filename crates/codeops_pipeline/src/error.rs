use codeops_github::FetchError;
use thiserror::Error;

use crate::client::ClientError;

/// Why a pipeline operation did not complete.
///
/// `Display` is the message stored in `PipelineState::error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Empty or malformed repository URL, detected before any request
    #[error(transparent)]
    InvalidUrl(#[from] FetchError),

    #[error("No files to analyze. Please clone a repository first.")]
    NoFiles,

    #[error(transparent)]
    Client(#[from] ClientError),

    /// A reset or newer operation started while this one was in flight; its
    /// result was discarded without touching state.
    #[error("Discarded: the pipeline was reset or restarted while this request was in flight")]
    Superseded,
}

impl PipelineError {
    pub fn is_input_error(&self) -> bool {
        matches!(self, PipelineError::InvalidUrl(_) | PipelineError::NoFiles)
    }
}
