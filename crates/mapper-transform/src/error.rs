//! Error types for mapper-transform

/// Result type for mapper-transform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while transforming a statement
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("API key not set: {var} is missing or empty")]
    MissingApiKey { var: String },

    #[error("Invalid dialect name: {name:?}")]
    InvalidDialect { name: String },

    #[error("{0}")]
    Rejected(String),
}

impl Error {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
