//! Error types for the generative-model collaborator.

use thiserror::Error;

/// Result type alias for model operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur while completing a prompt.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Model API key not configured. Set GEMINI_API_KEY")]
    MissingApiKey,

    #[error("Model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API rejected the request ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}
