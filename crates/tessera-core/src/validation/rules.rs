//! Per-field validation rules

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Regex rule source, compiled once when the rule is declared
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Result<Regex, regex::Error>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source);
        Self { source, compiled }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Why the source failed to compile, if it did
    pub fn error(&self) -> Option<&regex::Error> {
        self.compiled.as_ref().err()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A constraint applied to a field after its type has been checked
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    /// Minimum string length in characters
    MinLength(usize),

    /// Maximum string length in characters
    MaxLength(usize),

    /// Minimum numeric value (inclusive)
    MinValue(f64),

    /// Maximum numeric value (inclusive)
    MaxValue(f64),

    /// Regex the string must match
    Pattern(Pattern),

    /// String, array or object must not be empty
    NonEmpty,

    /// Minimum array length
    MinItems(usize),

    /// Maximum array length
    MaxItems(usize),

    /// Array items must be pairwise distinct
    UniqueItems,
}

impl ValidationRule {
    pub fn pattern(source: impl Into<String>) -> Self {
        ValidationRule::Pattern(Pattern::new(source))
    }

    /// Validate a value against this rule
    ///
    /// Rules only constrain values of the kind they talk about; a length rule
    /// on a number passes.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            ValidationRule::MinLength(min) => match value.as_str() {
                Some(s) if s.chars().count() < *min => Err(format!(
                    "String length {} is less than minimum {}",
                    s.chars().count(),
                    min
                )),
                _ => Ok(()),
            },

            ValidationRule::MaxLength(max) => match value.as_str() {
                Some(s) if s.chars().count() > *max => Err(format!(
                    "String length {} exceeds maximum {}",
                    s.chars().count(),
                    max
                )),
                _ => Ok(()),
            },

            ValidationRule::MinValue(min) => match value.as_f64() {
                Some(n) if n < *min => Err(format!("Value {} is less than minimum {}", n, min)),
                _ => Ok(()),
            },

            ValidationRule::MaxValue(max) => match value.as_f64() {
                Some(n) if n > *max => Err(format!("Value {} exceeds maximum {}", n, max)),
                _ => Ok(()),
            },

            ValidationRule::Pattern(pattern) => {
                let Some(s) = value.as_str() else {
                    return Ok(());
                };
                let re = pattern.compiled.as_ref().map_err(|e| {
                    format!("Invalid regex pattern '{}': {}", pattern.as_str(), e)
                })?;
                if re.is_match(s) {
                    Ok(())
                } else {
                    Err(format!(
                        "Value '{}' does not match pattern '{}'",
                        s,
                        pattern.as_str()
                    ))
                }
            }

            ValidationRule::NonEmpty => match value {
                Value::String(s) if s.trim().is_empty() => {
                    Err("String cannot be empty".to_string())
                }
                Value::Array(arr) if arr.is_empty() => Err("Array cannot be empty".to_string()),
                Value::Object(obj) if obj.is_empty() => Err("Object cannot be empty".to_string()),
                _ => Ok(()),
            },

            ValidationRule::MinItems(min) => match value.as_array() {
                Some(arr) if arr.len() < *min => Err(format!(
                    "Array has {} items, minimum is {}",
                    arr.len(),
                    min
                )),
                _ => Ok(()),
            },

            ValidationRule::MaxItems(max) => match value.as_array() {
                Some(arr) if arr.len() > *max => Err(format!(
                    "Array has {} items, maximum is {}",
                    arr.len(),
                    max
                )),
                _ => Ok(()),
            },

            ValidationRule::UniqueItems => {
                if let Some(arr) = value.as_array() {
                    let mut seen = HashSet::new();
                    for item in arr {
                        if !seen.insert(item.to_string()) {
                            return Err(format!("Array contains duplicate item {}", item));
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Rule name used as the field error code
    pub fn rule_name(&self) -> &'static str {
        match self {
            ValidationRule::MinLength(_) => "min_length",
            ValidationRule::MaxLength(_) => "max_length",
            ValidationRule::MinValue(_) => "min_value",
            ValidationRule::MaxValue(_) => "max_value",
            ValidationRule::Pattern(_) => "pattern",
            ValidationRule::NonEmpty => "non_empty",
            ValidationRule::MinItems(_) => "min_items",
            ValidationRule::MaxItems(_) => "max_items",
            ValidationRule::UniqueItems => "unique_items",
        }
    }

    /// Write the JSON Schema keyword for this rule into `target`
    pub(crate) fn write_json_schema(&self, target: &mut Map<String, Value>) {
        match self {
            ValidationRule::MinLength(n) => {
                target.insert("minLength".into(), Value::from(*n));
            }
            ValidationRule::MaxLength(n) => {
                target.insert("maxLength".into(), Value::from(*n));
            }
            ValidationRule::MinValue(n) => {
                target.insert("minimum".into(), Value::from(*n));
            }
            ValidationRule::MaxValue(n) => {
                target.insert("maximum".into(), Value::from(*n));
            }
            ValidationRule::Pattern(p) => {
                target.insert("pattern".into(), Value::from(p.as_str()));
            }
            ValidationRule::NonEmpty => {
                target.insert("minLength".into(), Value::from(1));
            }
            ValidationRule::MinItems(n) => {
                target.insert("minItems".into(), Value::from(*n));
            }
            ValidationRule::MaxItems(n) => {
                target.insert("maxItems".into(), Value::from(*n));
            }
            ValidationRule::UniqueItems => {
                target.insert("uniqueItems".into(), Value::Bool(true));
            }
        }
    }
}
