//! Renders validation failures into corrective feedback for the model

use super::checker::SchemaError;
use super::outcome::{SemanticIssue, ValidationIssue};
use serde_json::Value;

/// Render `issue` for the model, prefixed with the layer that raised it
///
/// The model always learns which layer failed and what that layer checks,
/// followed by a renderer chosen by the shape of the issue.
pub fn format_for_prompt(
    issue: &ValidationIssue,
    layer_name: &str,
    layer_description: &str,
) -> String {
    let body = match issue {
        ValidationIssue::Schema(err) => render_schema(err),
        ValidationIssue::Semantic(issues) => render_semantic(issues),
        ValidationIssue::Message(message) => render_message(message),
        ValidationIssue::Unknown(value) => render_unknown(value),
    };
    format!(
        "Validation layer \"{}\" rejected the output.\nThis layer checks: {}\n\n{}",
        layer_name,
        layer_description.trim(),
        body
    )
}

fn render_schema(err: &SchemaError) -> String {
    let mut lines = vec![format!(
        "The output does not match the required schema ({} problem{}):",
        err.error_count(),
        if err.error_count() == 1 { "" } else { "s" }
    )];
    for general in &err.general_errors {
        lines.push(format!("- {}", general));
    }
    for (field, errors) in &err.field_errors {
        for error in errors {
            let mut line = format!("- `{}`: {}", field, error.message);
            if let (Some(expected), Some(actual)) = (&error.expected, &error.actual) {
                if error.code != "type_mismatch" {
                    line.push_str(&format!(" (expected {}, got {})", expected, actual));
                }
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}

fn render_semantic(issues: &[SemanticIssue]) -> String {
    if issues.is_empty() {
        return "The output failed a semantic check.".to_string();
    }
    let mut lines = vec!["The output is structurally valid but has these problems:".to_string()];
    for (index, issue) in issues.iter().enumerate() {
        let mut line = match &issue.path {
            Some(path) => format!("{}. At `{}`: {}", index + 1, path, issue.message),
            None => format!("{}. {}", index + 1, issue.message),
        };
        if let Some(suggestion) = &issue.suggestion {
            line.push_str(&format!("\n   Suggestion: {}", suggestion));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn render_message(message: &str) -> String {
    format!("Error: {}", message.trim())
}

fn render_unknown(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("Unexpected validation result:\n```json\n{}\n```", pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::SchemaBuilder;
    use serde_json::json;

    #[test]
    fn test_schema_rendering() {
        let schema = SchemaBuilder::new().number("x").string("label").build();
        let err = schema.check(&json!({ "x": "1" })).unwrap_err();

        let text = format_for_prompt(&err.into(), "schema", "Checks the output shape");
        assert!(text.starts_with("Validation layer \"schema\" rejected the output."));
        assert!(text.contains("This layer checks: Checks the output shape"));
        assert!(text.contains("(2 problems)"));
        assert!(text.contains("- `label`: Field is required"));
        assert!(text.contains("- `x`: Expected number, got string"));
    }

    #[test]
    fn test_semantic_rendering() {
        let issue = ValidationIssue::semantic([
            SemanticIssue::new("Series lengths differ").at("series[1]"),
            SemanticIssue::new("Chart has no title").suggest("Add a short title"),
        ]);
        let text = format_for_prompt(&issue, "renderable", "Checks the chart can be drawn");
        assert!(text.contains("1. At `series[1]`: Series lengths differ"));
        assert!(text.contains("2. Chart has no title\n   Suggestion: Add a short title"));
    }

    #[test]
    fn test_message_and_unknown_rendering() {
        let issue = ValidationIssue::message(" too long ");
        let text = format_for_prompt(&issue, "length", "Limits size");
        assert!(text.ends_with("Error: too long"));

        let text = format_for_prompt(
            &ValidationIssue::Unknown(json!({ "code": 7 })),
            "legacy",
            "Old checker",
        );
        assert!(text.contains("```json"));
        assert!(text.contains("\"code\": 7"));
    }
}
