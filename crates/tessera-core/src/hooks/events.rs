//! Hook kinds and the events passed to observability callbacks

use crate::agent::ExecutionMetrics;
use crate::error::AgentError;
use crate::validation::{ValidationFailure, ValidatorKind};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// The eight transitions a caller can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    AttemptStart,
    AttemptComplete,
    ValidationStart,
    ValidationComplete,
    ToolCall,
    ToolResult,
    Success,
    Failure,
}

impl HookKind {
    pub fn all() -> &'static [HookKind] {
        &[
            HookKind::AttemptStart,
            HookKind::AttemptComplete,
            HookKind::ValidationStart,
            HookKind::ValidationComplete,
            HookKind::ToolCall,
            HookKind::ToolResult,
            HookKind::Success,
            HookKind::Failure,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::AttemptStart => "attempt_start",
            HookKind::AttemptComplete => "attempt_complete",
            HookKind::ValidationStart => "validation_start",
            HookKind::ValidationComplete => "validation_complete",
            HookKind::ToolCall => "tool_call",
            HookKind::ToolResult => "tool_result",
            HookKind::Success => "success",
            HookKind::Failure => "failure",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A new attempt is about to prompt the model
#[derive(Debug, Clone)]
pub struct AttemptStartEvent {
    pub execution_id: Uuid,
    pub agent_name: String,
    pub attempt: u32,
    pub max_attempts: u32,
}

/// An attempt ended, either with a valid output or a rejection
#[derive(Debug, Clone)]
pub struct AttemptCompleteEvent {
    pub execution_id: Uuid,
    pub attempt: u32,
    /// `None` when the output validated
    pub failure: Option<ValidationFailure>,
    pub duration: Duration,
}

impl AttemptCompleteEvent {
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

/// A validation layer is about to run
#[derive(Debug, Clone)]
pub struct ValidationStartEvent {
    pub execution_id: Uuid,
    pub attempt: u32,
    pub validator_name: String,
    pub validator_kind: ValidatorKind,
}

/// A validation layer finished
#[derive(Debug, Clone)]
pub struct ValidationCompleteEvent {
    pub execution_id: Uuid,
    pub attempt: u32,
    pub validator_name: String,
    pub failure: Option<ValidationFailure>,
    pub duration: Duration,
}

impl ValidationCompleteEvent {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// The model requested a helper tool
#[derive(Debug, Clone)]
pub struct ToolCallEvent {
    pub execution_id: Uuid,
    pub attempt: u32,
    pub iteration: u32,
    pub call_id: String,
    pub tool_name: String,
    pub arguments: Value,
}

/// A helper tool call was answered
#[derive(Debug, Clone)]
pub struct ToolResultEvent {
    pub execution_id: Uuid,
    pub attempt: u32,
    pub iteration: u32,
    pub call_id: String,
    pub tool_name: String,
    pub result: Value,
    pub is_error: bool,
}

#[derive(Debug, Clone)]
pub struct SuccessEvent {
    pub execution_id: Uuid,
    pub output: Value,
    pub attempts: u32,
    pub metrics: ExecutionMetrics,
}

#[derive(Debug, Clone)]
pub struct FailureEvent {
    pub execution_id: Uuid,
    pub attempts: u32,
    /// Empty when the execution was cancelled
    pub errors: Vec<AgentError>,
    pub cancelled: bool,
}
