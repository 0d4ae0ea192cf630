//! Core error enum for Tessera

use std::fmt;

use thiserror::Error;

use crate::hooks::HookKind;
use crate::validation::ValidationFailure;

/// Result type alias for Tessera operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Which prompt builder produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    System,
    User,
    Error,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptKind::System => write!(f, "system"),
            PromptKind::User => write!(f, "user"),
            PromptKind::Error => write!(f, "error"),
        }
    }
}

/// Main error type for Tessera
///
/// Construction-time variants are always returned as a batch from
/// [`AgentDefinitionBuilder::build`](crate::agent::AgentDefinitionBuilder::build).
/// Execution-time variants end up in
/// [`ExecutionFailure::Failed`](crate::agent::ExecutionFailure::Failed).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    /// Agent name is empty after trimming
    #[error("Agent name cannot be empty")]
    EmptyName,

    /// Agent description is empty after trimming
    #[error("Agent description cannot be empty")]
    EmptyDescription,

    /// Model name is empty after trimming
    #[error("Model name cannot be empty")]
    EmptyModelName,

    /// No output tool was declared
    #[error("An output tool with a parameter schema is required")]
    MissingOutputTool,

    /// No prompt builder was supplied
    #[error("Prompt builders are required")]
    MissingPrompts,

    #[error("max_attempts must be at least 1, got {value}")]
    InvalidMaxAttempts { value: u32 },

    #[error("max_iterations must be at least 1, got {value}")]
    InvalidMaxIterations { value: u32 },

    #[error("Temperature must be between {min} and {max}, got {value}")]
    TemperatureOutOfRange { value: f32, min: f32, max: f32 },

    #[error("max_tokens must be at least {min}, got {value}")]
    MaxTokensTooLow { value: u32, min: u32 },

    /// Two tools share a name (helper/helper or helper/output)
    #[error("Duplicate tool name: {name}")]
    DuplicateTool { name: String },

    /// A schema rule carries a regex that does not compile
    #[error("Invalid pattern '{pattern}' for field '{field}' in '{owner}': {message}")]
    InvalidPattern {
        owner: String,
        field: String,
        pattern: String,
        message: String,
    },

    /// An attempt's output was rejected by a validation layer
    #[error("Attempt {attempt} rejected by {failure}")]
    OutputInvalid {
        attempt: u32,
        failure: ValidationFailure,
    },

    /// A prompt builder failed during execution
    #[error("Failed to build {kind} prompt: {message}")]
    PromptGeneration { kind: PromptKind, message: String },

    /// The model kept calling tools without submitting output
    #[error("Attempt {attempt} used {max_iterations} model iterations without submitting output")]
    MaxIterationsExceeded { attempt: u32, max_iterations: u32 },

    /// Every attempt produced an invalid output
    #[error("All {max_attempts} attempts failed validation; last rejected by {last_failure}")]
    MaxAttemptsExceeded {
        max_attempts: u32,
        last_failure: ValidationFailure,
    },

    #[error("Model API error: {message}")]
    ModelApi {
        message: String,
        status: Option<u16>,
    },

    #[error("Model rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Model token limit exceeded: {message}")]
    TokenLimitExceeded { message: String },

    #[error("Malformed model response: {message}")]
    MalformedResponse { message: String },

    /// An observability callback failed; logged and swallowed
    #[error("Callback '{hook}' failed: {message}")]
    CallbackFailed { hook: HookKind, message: String },
}

impl AgentError {
    /// The validation failure carried by this error, if any
    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::OutputInvalid { failure, .. } => Some(failure),
            Self::MaxAttemptsExceeded { last_failure, .. } => Some(last_failure),
            _ => None,
        }
    }

    /// Whether this error was raised while building an agent definition
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyName
                | Self::EmptyDescription
                | Self::EmptyModelName
                | Self::MissingOutputTool
                | Self::MissingPrompts
                | Self::InvalidMaxAttempts { .. }
                | Self::InvalidMaxIterations { .. }
                | Self::TemperatureOutOfRange { .. }
                | Self::MaxTokensTooLow { .. }
                | Self::DuplicateTool { .. }
                | Self::InvalidPattern { .. }
        )
    }
}
