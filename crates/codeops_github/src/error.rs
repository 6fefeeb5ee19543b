use thiserror::Error;

/// Errors from the Repository Fetch service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// No URL was supplied
    #[error("Repository URL is required")]
    MissingUrl,

    /// The URL is not of the form `github.com/<owner>/<repo>`
    #[error("Invalid GitHub URL format")]
    InvalidUrl(String),

    /// Metadata lookup failed (missing, private, or otherwise inaccessible)
    #[error("Repository not found or not accessible: {owner}/{repo}")]
    RepositoryNotFound { owner: String, repo: String },

    /// A contents listing returned a non-success status
    #[error("GitHub API error: {status} {reason}")]
    Api { status: u16, reason: String },

    /// A single file download failed
    #[error("Failed to fetch file {path}: {message}")]
    Download { path: String, message: String },

    /// The request never produced a response, or the body was unreadable
    #[error("GitHub request failed: {0}")]
    Transport(String),
}

impl FetchError {
    /// Input errors are detected before any network call.
    pub fn is_input_error(&self) -> bool {
        matches!(self, FetchError::MissingUrl | FetchError::InvalidUrl(_))
    }

    /// HTTP status the service answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::MissingUrl | FetchError::InvalidUrl(_) => 400,
            FetchError::RepositoryNotFound { .. } => 404,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}
