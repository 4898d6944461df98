//! Error types for publishing integrations.

use thiserror::Error;

/// Result type alias for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors that can occur while verifying or publishing.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Provider rejected the token: {0}")]
    InvalidCredential(String),

    #[error("No connection for {0}. Authenticate first")]
    MissingConnection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Provider API error: {0}")]
    Http(#[from] reqwest::Error),
}
