//! Output validation
//!
//! Candidate outputs pass through an ordered list of [`Validator`] layers.
//! The first layer to reject an output ends the pass; its issue is rendered
//! into corrective feedback for the next attempt.
//!
//! The structural schema framework here is also used to check helper tool
//! arguments before their reducers run.

mod checker;
mod format;
mod layer;
mod outcome;
mod pipeline;
mod rules;
mod schema;

pub use checker::{FieldError, SchemaError};
pub use format::format_for_prompt;
pub use layer::{FnValidator, SchemaValidator, Validator, ValidatorKind};
#[cfg(test)]
pub use layer::MockValidator;
pub use outcome::{SemanticIssue, ValidationFailure, ValidationIssue, ValidationOutcome};
pub use pipeline::{Interrupted, PipelineRun, ValidationPipeline};
pub use rules::{Pattern, ValidationRule};
pub use schema::{FieldSchema, FieldType, PatternError, ValidationSchema};

/// Fluent builder for [`ValidationSchema`]
///
/// Shorthand methods add required fields; the `optional_*` variants add
/// fields that may be absent or null.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    schema: ValidationSchema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(self, name: impl Into<String>) -> Self {
        self.field(name, FieldSchema::new(FieldType::String).required(true))
    }

    pub fn optional_string(self, name: impl Into<String>) -> Self {
        self.field(name, FieldSchema::new(FieldType::String))
    }

    pub fn integer(self, name: impl Into<String>) -> Self {
        self.field(name, FieldSchema::new(FieldType::Integer).required(true))
    }

    pub fn optional_integer(self, name: impl Into<String>) -> Self {
        self.field(name, FieldSchema::new(FieldType::Integer))
    }

    pub fn number(self, name: impl Into<String>) -> Self {
        self.field(name, FieldSchema::new(FieldType::Number).required(true))
    }

    pub fn boolean(self, name: impl Into<String>) -> Self {
        self.field(name, FieldSchema::new(FieldType::Boolean).required(true))
    }

    pub fn array(self, name: impl Into<String>, items: FieldSchema) -> Self {
        self.field(
            name,
            FieldSchema::new(FieldType::Array).required(true).items(items),
        )
    }

    pub fn object(self, name: impl Into<String>, nested: ValidationSchema) -> Self {
        self.field(
            name,
            FieldSchema::new(FieldType::Object).required(true).nested(nested),
        )
    }

    /// Add a field with a fully specified schema
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.schema.add_field(name, schema);
        self
    }

    pub fn allow_extra_fields(mut self, allow: bool) -> Self {
        self.schema.allow_extra_fields = allow;
        self
    }

    pub fn build(self) -> ValidationSchema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_shorthands() {
        let schema = SchemaBuilder::new()
            .string("title")
            .optional_integer("limit")
            .boolean("stacked")
            .array("values", FieldSchema::new(FieldType::Number))
            .build();

        assert!(schema.is_field_required("title"));
        assert!(!schema.is_field_required("limit"));
        assert!(schema
            .check(&json!({ "title": "t", "stacked": false, "values": [1, 2.5] }))
            .is_ok());
        assert!(schema
            .check(&json!({ "title": "t", "stacked": false, "values": [1, "2"] }))
            .is_err());
    }
}
