//! Results produced by validation layers

use super::checker::SchemaError;
use serde_json::Value;
use std::fmt;

/// One problem reported by a semantic (custom) validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticIssue {
    /// Location in the output, e.g. `series[0].data`; `None` for whole-output problems
    pub path: Option<String>,
    pub message: String,
    /// Optional hint on how to fix it
    pub suggestion: Option<String>,
}

impl SemanticIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for SemanticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// What a validator reports when it rejects an output
///
/// The shape decides how the problem is rendered into the corrective prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Structural errors from a schema check
    Schema(SchemaError),
    /// Business-rule problems from a custom validator
    Semantic(Vec<SemanticIssue>),
    /// A plain error message
    Message(String),
    /// Arbitrary structured payload the engine has no renderer for
    Unknown(Value),
}

impl ValidationIssue {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn semantic(issues: impl IntoIterator<Item = SemanticIssue>) -> Self {
        Self::Semantic(issues.into_iter().collect())
    }
}

impl From<SchemaError> for ValidationIssue {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<String> for ValidationIssue {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for ValidationIssue {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "{}", err),
            Self::Semantic(issues) => {
                let rendered: Vec<String> = issues.iter().map(ToString::to_string).collect();
                write!(f, "{}", rendered.join("; "))
            }
            Self::Message(message) => write!(f, "{}", message),
            Self::Unknown(value) => write!(f, "{}", value),
        }
    }
}

/// A rejected output, tagged with the layer that rejected it
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub issue: ValidationIssue,
    pub validator_name: String,
    pub validator_description: String,
}

impl ValidationFailure {
    pub fn new(
        issue: ValidationIssue,
        validator_name: impl Into<String>,
        validator_description: impl Into<String>,
    ) -> Self {
        Self {
            issue,
            validator_name: validator_name.into(),
            validator_description: validator_description.into(),
        }
    }

    /// Render for a corrective prompt
    pub fn to_prompt(&self) -> String {
        super::format::format_for_prompt(
            &self.issue,
            &self.validator_name,
            &self.validator_description,
        )
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.validator_name, self.issue)
    }
}

/// Result of running the validation pipeline over one candidate output
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid(Value),
    Invalid(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(failure) => Some(failure),
        }
    }
}
