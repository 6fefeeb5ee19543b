use thiserror::Error;

/// Failure of a single upstream provider call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// HTTP 429
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// HTTP 402
    #[error("AI credits exhausted. Please add more credits.")]
    QuotaExhausted,

    #[error("{provider} error: {status}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    /// 2xx but no `choices[0].message.content`
    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: String },
}

/// Errors returned by the AI Action service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Files array is required")]
    MissingFiles,

    #[error("Invalid action")]
    InvalidAction(String),

    /// The body was not a JSON object of the expected shape
    #[error("Invalid request: {0}")]
    Malformed(String),

    #[error("No AI API key configured or all AI calls failed")]
    NoProviders,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ActionError {
    pub fn status_code(&self) -> u16 {
        match self {
            ActionError::MissingFiles
            | ActionError::InvalidAction(_)
            | ActionError::Malformed(_) => 400,
            ActionError::NoProviders | ActionError::Provider(_) => 500,
        }
    }
}
