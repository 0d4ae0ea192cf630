//! Error codes, categories and severities

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::AgentError;

/// Broad error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Output failed a pipeline layer, or configuration failed construction checks
    Validation,
    /// Prompt generation failure or budget exhaustion
    Execution,
    /// Provider-level failure
    Model,
    /// Instrumentation failure; never propagated
    Observability,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Execution => write!(f, "execution"),
            ErrorCategory::Model => write!(f, "model"),
            ErrorCategory::Observability => write!(f, "observability"),
        }
    }
}

/// How bad an error is for the execution that raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Recorded, execution continues
    Warning,
    /// The operation failed but the caller may fix and retry
    Error,
    /// Execution cannot continue
    Fatal,
}

impl AgentError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "TESSERA_EMPTY_NAME",
            Self::EmptyDescription => "TESSERA_EMPTY_DESCRIPTION",
            Self::EmptyModelName => "TESSERA_EMPTY_MODEL_NAME",
            Self::MissingOutputTool => "TESSERA_MISSING_OUTPUT_TOOL",
            Self::MissingPrompts => "TESSERA_MISSING_PROMPTS",
            Self::InvalidMaxAttempts { .. } => "TESSERA_INVALID_MAX_ATTEMPTS",
            Self::InvalidMaxIterations { .. } => "TESSERA_INVALID_MAX_ITERATIONS",
            Self::TemperatureOutOfRange { .. } => "TESSERA_TEMPERATURE_OUT_OF_RANGE",
            Self::MaxTokensTooLow { .. } => "TESSERA_MAX_TOKENS_TOO_LOW",
            Self::DuplicateTool { .. } => "TESSERA_DUPLICATE_TOOL",
            Self::InvalidPattern { .. } => "TESSERA_INVALID_PATTERN",
            Self::OutputInvalid { .. } => "TESSERA_OUTPUT_INVALID",
            Self::PromptGeneration { .. } => "TESSERA_PROMPT_GENERATION",
            Self::MaxIterationsExceeded { .. } => "TESSERA_MAX_ITERATIONS_EXCEEDED",
            Self::MaxAttemptsExceeded { .. } => "TESSERA_MAX_ATTEMPTS_EXCEEDED",
            Self::ModelApi { .. } => "TESSERA_MODEL_API",
            Self::RateLimited { .. } => "TESSERA_RATE_LIMITED",
            Self::TokenLimitExceeded { .. } => "TESSERA_TOKEN_LIMIT_EXCEEDED",
            Self::MalformedResponse { .. } => "TESSERA_MALFORMED_RESPONSE",
            Self::CallbackFailed { .. } => "TESSERA_CALLBACK_FAILED",
        }
    }

    /// Category this error reports under
    pub fn category(&self) -> ErrorCategory {
        match self {
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
            | Self::OutputInvalid { .. } => ErrorCategory::Validation,
            Self::PromptGeneration { .. }
            | Self::MaxIterationsExceeded { .. }
            | Self::MaxAttemptsExceeded { .. } => ErrorCategory::Execution,
            Self::ModelApi { .. }
            | Self::RateLimited { .. }
            | Self::TokenLimitExceeded { .. }
            | Self::MalformedResponse { .. } => ErrorCategory::Model,
            Self::CallbackFailed { .. } => ErrorCategory::Observability,
        }
    }

    pub fn severity(&self) -> Severity {
        match self.category() {
            ErrorCategory::Observability => Severity::Warning,
            ErrorCategory::Model => Severity::Fatal,
            ErrorCategory::Execution => Severity::Fatal,
            ErrorCategory::Validation if matches!(self, Self::OutputInvalid { .. }) => {
                Severity::Warning
            }
            ErrorCategory::Validation => Severity::Error,
        }
    }

    /// Whether re-running the whole execution could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::ModelApi { status: Some(500..=599), .. }
        )
    }
}
