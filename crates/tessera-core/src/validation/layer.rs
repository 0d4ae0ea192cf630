//! Validator trait and the bundled validator kinds

use super::outcome::ValidationIssue;
use super::schema::{PatternError, ValidationSchema};
use crate::agent::ExecutionContext;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// What a validator checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    /// Structural conformance
    Schema,
    /// Semantic or business checks
    Custom,
}

/// One layer of the validation pipeline
///
/// Validators run in declaration order; the first one to return `Err` stops
/// the pipeline and its issue becomes the corrective feedback for the next
/// attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Validator: Send + Sync {
    /// Short unique name, shown to the model when this layer fails
    fn name(&self) -> &str;

    /// Human-readable description of what this layer checks
    fn description(&self) -> &str;

    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Custom
    }

    /// Regex rules that failed to compile; checked when the agent is built
    fn pattern_errors(&self) -> Vec<PatternError> {
        Vec::new()
    }

    /// Validate a candidate output
    async fn validate(
        &self,
        output: &Value,
        context: &ExecutionContext,
    ) -> Result<(), ValidationIssue>;
}

/// Structural validator backed by a [`ValidationSchema`]
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    name: String,
    description: String,
    schema: ValidationSchema,
}

impl SchemaValidator {
    pub fn new(schema: ValidationSchema) -> Self {
        Self {
            name: "schema".to_string(),
            description: "The output must match the declared JSON structure".to_string(),
            schema,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn schema(&self) -> &ValidationSchema {
        &self.schema
    }
}

#[async_trait]
impl Validator for SchemaValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Schema
    }

    fn pattern_errors(&self) -> Vec<PatternError> {
        self.schema.pattern_errors()
    }

    async fn validate(
        &self,
        output: &Value,
        _context: &ExecutionContext,
    ) -> Result<(), ValidationIssue> {
        self.schema.check(output).map_err(ValidationIssue::Schema)
    }
}

type CheckFn = dyn Fn(&Value, &ExecutionContext) -> Result<(), ValidationIssue> + Send + Sync;

/// Custom validator wrapping a synchronous closure
pub struct FnValidator {
    name: String,
    description: String,
    check: Box<CheckFn>,
}

impl FnValidator {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &ExecutionContext) -> Result<(), ValidationIssue> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            check: Box::new(check),
        }
    }
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

#[async_trait]
impl Validator for FnValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn validate(
        &self,
        output: &Value,
        context: &ExecutionContext,
    ) -> Result<(), ValidationIssue> {
        (self.check)(output, context)
    }
}
