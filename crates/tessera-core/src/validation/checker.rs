//! Checks JSON values against a [`ValidationSchema`]

use super::schema::{FieldSchema, FieldType, ValidationSchema};
use serde_json::Value;
use std::collections::BTreeMap;

/// Every structural problem found in one value, keyed by field path
#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("Schema validation failed: {}", self.all_errors().join("; "))]
pub struct SchemaError {
    /// Errors by field path (`a.b`, `items[2]`)
    pub field_errors: BTreeMap<String, Vec<FieldError>>,

    /// Errors not tied to a specific field
    pub general_errors: Vec<String>,
}

impl SchemaError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field_error(&mut self, field: impl Into<String>, error: FieldError) {
        self.field_errors.entry(field.into()).or_default().push(error);
    }

    pub fn add_general_error(&mut self, error: impl Into<String>) {
        self.general_errors.push(error.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.field_errors.is_empty() || !self.general_errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.field_errors.values().map(Vec::len).sum::<usize>() + self.general_errors.len()
    }

    /// All errors as `path: message` strings, general errors first
    pub fn all_errors(&self) -> Vec<String> {
        let mut errors = self.general_errors.clone();
        for (field, field_errors) in &self.field_errors {
            for error in field_errors {
                errors.push(format!("{}: {}", field, error.message));
            }
        }
        errors
    }
}

/// Error for a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub code: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl FieldError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    pub fn required() -> Self {
        Self::new("required", "Field is required")
    }

    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self::new("type_mismatch", format!("Expected {}, got {}", expected, actual))
            .expected(expected)
            .actual(actual)
    }

    pub fn invalid_enum(allowed: &[String], actual: &str) -> Self {
        Self::new(
            "invalid_enum",
            format!("Value must be one of: {}", allowed.join(", ")),
        )
        .expected(allowed.join(" | "))
        .actual(actual)
    }

    pub fn unknown_field() -> Self {
        Self::new("unknown_field", "Unknown field")
    }
}

impl ValidationSchema {
    /// Check `value` against this schema, collecting every error
    pub fn check(&self, value: &Value) -> Result<(), SchemaError> {
        let mut errors = SchemaError::new();
        check_object(self, value, "", &mut errors);
        if errors.has_errors() {
            Err(errors)
        } else {
            Ok(())
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn check_object(schema: &ValidationSchema, value: &Value, prefix: &str, errors: &mut SchemaError) {
    let Some(obj) = value.as_object() else {
        let message = format!("Expected an object, got {}", FieldType::of(value));
        if prefix.is_empty() {
            errors.add_general_error(message);
        } else {
            errors.add_field_error(
                prefix,
                FieldError::type_mismatch("object", FieldType::of(value)),
            );
        }
        return;
    };

    for required in &schema.required {
        if !obj.contains_key(required) {
            errors.add_field_error(join_path(prefix, required), FieldError::required());
        }
    }

    for (name, field_value) in obj {
        let path = join_path(prefix, name);
        match schema.fields.get(name) {
            Some(field_schema) => check_field(&path, field_value, field_schema, errors),
            None if !schema.allow_extra_fields => {
                errors.add_field_error(path, FieldError::unknown_field());
            }
            None => {}
        }
    }
}

fn check_field(path: &str, value: &Value, schema: &FieldSchema, errors: &mut SchemaError) {
    // An optional field explicitly set to null is treated as absent.
    if value.is_null() && !schema.is_required() && schema.field_type != FieldType::Null {
        return;
    }

    if !schema.field_type.matches(value) {
        errors.add_field_error(
            path,
            FieldError::type_mismatch(&schema.field_type.type_name(), FieldType::of(value)),
        );
        return;
    }

    if let (Some(allowed), Some(s)) = (&schema.enum_values, value.as_str()) {
        if !allowed.iter().any(|a| a == s) {
            errors.add_field_error(path, FieldError::invalid_enum(allowed, s));
        }
    }

    for rule in &schema.rules {
        if let Err(message) = rule.validate(value) {
            errors.add_field_error(path, FieldError::new(rule.rule_name(), message));
        }
    }

    if let Some(nested) = &schema.nested_schema {
        if value.is_object() {
            check_object(nested, value, path, errors);
        }
    }

    if let (Some(item_schema), Some(items)) = (&schema.item_schema, value.as_array()) {
        for (index, item) in items.iter().enumerate() {
            check_field(&format!("{}[{}]", path, index), item, item_schema, errors);
        }
    }
}
