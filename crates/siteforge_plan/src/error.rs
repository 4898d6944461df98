//! Error types for plan parsing and resolution.

use thiserror::Error;

/// Result type alias for plan operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that can occur while extracting or resolving a plan.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("No structured plan could be recovered from the model response")]
    UnparsableResponse,

    #[error("Plan action '{action}' failed: {message}")]
    Action { action: String, message: String },
}

impl PlanError {
    pub fn action(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Action {
            action: action.into(),
            message: message.into(),
        }
    }
}
