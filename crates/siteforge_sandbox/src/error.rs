//! Error types for sandbox orchestration.

use thiserror::Error;

/// Result type alias for sandbox operations.
pub type SandboxResult<T> = Result<T, SandboxError>;

/// Errors that can occur while driving the remote sandbox.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Sandbox session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("File operation failed on {path}: {message}")]
    FileOperation { path: String, message: String },

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Sandbox API error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid sandbox response: {0}")]
    InvalidResponse(String),

    #[error("Step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<SandboxError>,
    },
}

impl SandboxError {
    pub fn file(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileOperation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Attach the failing lifecycle step's name.
    pub fn step(step: impl Into<String>, source: SandboxError) -> Self {
        Self::Step {
            step: step.into(),
            source: Box::new(source),
        }
    }
}
