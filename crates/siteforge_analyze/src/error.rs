//! Error types for the analysis module.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

/// Errors that can occur while analyzing a website.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },
}

impl AnalyzeError {
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }
}
