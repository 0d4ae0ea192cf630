//! Structural schema definitions for JSON outputs and tool inputs

use super::rules::{Pattern, ValidationRule};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Field type for validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    /// Integer type (i64 or u64)
    Integer,
    /// Any JSON number
    Number,
    Boolean,
    Array,
    Object,
    /// No type checking
    Any,
    Null,
    /// Union of multiple types
    Union(Vec<FieldType>),
}

impl FieldType {
    /// Check if a JSON value matches this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Any => true,
            FieldType::Null => value.is_null(),
            FieldType::Union(types) => types.iter().any(|t| t.matches(value)),
        }
    }

    /// Type name used in error messages
    pub fn type_name(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::Number => "number".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Array => "array".to_string(),
            FieldType::Object => "object".to_string(),
            FieldType::Any => "any".to_string(),
            FieldType::Null => "null".to_string(),
            FieldType::Union(types) => types
                .iter()
                .map(FieldType::type_name)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }

    /// Name of the JSON type of `value`, in the vocabulary of [`type_name`](Self::type_name)
    pub fn of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    fn json_schema_type(&self) -> Option<Value> {
        match self {
            FieldType::Any => None,
            FieldType::Union(types) => Some(Value::Array(
                types.iter().filter_map(FieldType::json_schema_type).collect(),
            )),
            other => Some(Value::String(other.type_name())),
        }
    }
}

/// Schema for a single field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub field_type: FieldType,

    required: bool,

    pub description: Option<String>,

    pub rules: Vec<ValidationRule>,

    /// Nested schema for objects
    pub nested_schema: Option<Box<ValidationSchema>>,

    /// Item schema for arrays
    pub item_schema: Option<Box<FieldSchema>>,

    /// Allowed values for string fields
    pub enum_values: Option<Vec<String>>,
}

impl FieldSchema {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            description: None,
            rules: Vec::new(),
            nested_schema: None,
            item_schema: None,
            enum_values: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set nested schema for object types
    pub fn nested(mut self, schema: ValidationSchema) -> Self {
        self.nested_schema = Some(Box::new(schema));
        self
    }

    /// Set item schema for array types
    pub fn items(mut self, schema: FieldSchema) -> Self {
        self.item_schema = Some(Box::new(schema));
        self
    }

    pub fn enum_of(mut self, values: Vec<impl Into<String>>) -> Self {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn min_length(self, min: usize) -> Self {
        self.rule(ValidationRule::MinLength(min))
    }

    pub fn max_length(self, max: usize) -> Self {
        self.rule(ValidationRule::MaxLength(max))
    }

    pub fn min_value(self, min: f64) -> Self {
        self.rule(ValidationRule::MinValue(min))
    }

    pub fn max_value(self, max: f64) -> Self {
        self.rule(ValidationRule::MaxValue(max))
    }

    pub fn pattern(self, pattern: impl Into<String>) -> Self {
        self.rule(ValidationRule::pattern(pattern))
    }

    pub fn non_empty(self) -> Self {
        self.rule(ValidationRule::NonEmpty)
    }

    /// Render this field as a JSON Schema fragment
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        if let Some(ty) = self.field_type.json_schema_type() {
            out.insert("type".into(), ty);
        }
        if let Some(desc) = &self.description {
            out.insert("description".into(), Value::from(desc.as_str()));
        }
        if let Some(values) = &self.enum_values {
            out.insert("enum".into(), json!(values));
        }
        for rule in &self.rules {
            rule.write_json_schema(&mut out);
        }
        if let Some(nested) = &self.nested_schema {
            if let Value::Object(nested) = nested.to_json_schema() {
                for (key, value) in nested {
                    if key != "type" {
                        out.insert(key, value);
                    }
                }
            }
        }
        if let Some(items) = &self.item_schema {
            out.insert("items".into(), items.to_json_schema());
        }
        Value::Object(out)
    }
}

/// A pattern rule whose regex does not compile
#[derive(Debug, Clone, PartialEq)]
pub struct PatternError {
    /// Field path, `a.b` for nested objects and `a[]` for array items
    pub field: String,
    pub pattern: String,
    pub message: String,
}

impl FieldSchema {
    fn collect_pattern_errors(&self, path: &str, out: &mut Vec<PatternError>) {
        for rule in &self.rules {
            if let ValidationRule::Pattern(pattern) = rule {
                push_pattern_error(path, pattern, out);
            }
        }
        if let Some(nested) = &self.nested_schema {
            nested.collect_pattern_errors(path, out);
        }
        if let Some(items) = &self.item_schema {
            items.collect_pattern_errors(&format!("{}[]", path), out);
        }
    }
}

fn push_pattern_error(path: &str, pattern: &Pattern, out: &mut Vec<PatternError>) {
    if let Some(err) = pattern.error() {
        out.push(PatternError {
            field: path.to_string(),
            pattern: pattern.as_str().to_string(),
            message: err.to_string(),
        });
    }
}

/// Object schema: named fields, which of them are required, and whether
/// unknown fields are tolerated
///
/// Fields are kept ordered so error reports and rendered schemas are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSchema {
    pub fields: BTreeMap<String, FieldSchema>,

    pub required: Vec<String>,

    pub allow_extra_fields: bool,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, name: impl Into<String>, schema: FieldSchema) {
        let name = name.into();
        if schema.is_required() && !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.fields.insert(name, schema);
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn is_field_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Every pattern rule in this schema, nested ones included, that failed
    /// to compile
    pub fn pattern_errors(&self) -> Vec<PatternError> {
        let mut out = Vec::new();
        self.collect_pattern_errors("", &mut out);
        out
    }

    fn collect_pattern_errors(&self, prefix: &str, out: &mut Vec<PatternError>) {
        for (name, field) in &self.fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            field.collect_pattern_errors(&path, out);
        }
    }

    /// Render as a JSON Schema `object` suitable for a tool descriptor
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), field.to_json_schema()))
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required,
            "additionalProperties": self.allow_extra_fields,
        })
    }
}
