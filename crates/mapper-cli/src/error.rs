//! Error types for mapper-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from mapper-core
    #[error(transparent)]
    Core(#[from] mapper_core::Error),

    /// Error from mapper-fs
    #[error(transparent)]
    Fs(#[from] mapper_fs::Error),

    /// Error from mapper-blocks
    #[error(transparent)]
    Blocks(#[from] mapper_blocks::Error),

    /// Error from mapper-transform
    #[error(transparent)]
    Transform(#[from] mapper_transform::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
