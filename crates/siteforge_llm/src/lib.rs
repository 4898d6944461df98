//! # siteforge_llm
//!
//! Generative-model collaborator: given a prompt or message sequence,
//! returns raw text for the plan parser. The only implementation talks to
//! the Google Generative Language API; the [`TextModel`] trait keeps the
//! orchestration flow testable without it.

pub mod error;
pub mod gemini;
pub mod prompt;
pub mod types;

pub use error::{LlmError, LlmResult};
pub use gemini::GeminiClient;
pub use types::{Message, MessageRole, TextModel};
