//! Prompt builders
//!
//! Every attempt needs a system prompt plus either the initial user prompt
//! (attempt 1) or an error prompt describing why the previous output was
//! rejected.

mod template;
mod templates;

pub use templates::TemplatePrompts;

use crate::agent::ExecutionContext;
use crate::error::PromptKind;
use crate::validation::ValidationFailure;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("{kind} prompt template is empty")]
    Empty { kind: PromptKind },

    #[error("Unknown placeholder '{{{{{name}}}}}' in {kind} prompt template")]
    UnknownPlaceholder { kind: PromptKind, name: String },

    #[error("Unterminated placeholder at byte {offset} in {kind} prompt template")]
    Unterminated { kind: PromptKind, offset: usize },

    #[error("Placeholder '{{{{{name}}}}}' is error-prompt only, found in {kind} prompt template")]
    PlaceholderNotAllowed { kind: PromptKind, name: String },

    #[error("Failed to read {kind} prompt template '{}': {source}", .path.display())]
    Io {
        kind: PromptKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render {kind} prompt: {message}")]
    Render { kind: PromptKind, message: String },
}

/// Builds the prompts for each attempt of an execution
#[async_trait]
pub trait PromptBuilder<I>: Send + Sync {
    async fn system_prompt(
        &self,
        input: &I,
        context: &ExecutionContext,
    ) -> Result<String, PromptError>;

    /// Prompt for the first attempt
    async fn user_prompt(
        &self,
        input: &I,
        context: &ExecutionContext,
    ) -> Result<String, PromptError>;

    /// Corrective prompt for attempts after the first
    async fn error_prompt(
        &self,
        input: &I,
        failure: &ValidationFailure,
        context: &ExecutionContext,
    ) -> Result<String, PromptError>;
}
