//! Reading a candidate output out of a plain-text model reply

use crate::validation::{ValidationFailure, ValidationIssue};
use serde_json::Value;

/// Name of the built-in layer that rejects unreadable text replies
pub const OUTPUT_FORMAT_LAYER: &str = "output_format";

const OUTPUT_FORMAT_DESCRIPTION: &str =
    "The output must be JSON, submitted through the output tool";

/// Parse a text reply as the candidate output
///
/// Code fences around the JSON are tolerated. Anything unparseable is
/// rejected by the `output_format` layer so it flows into the retry loop
/// like any other invalid output.
pub(crate) fn read_text_output(
    text: Option<&str>,
    output_tool: &str,
) -> Result<Value, ValidationFailure> {
    let body = text.map(strip_code_fences).unwrap_or_default();
    if body.is_empty() {
        return Err(reject(format!(
            "The reply contained no output. Submit the result by calling the `{}` tool.",
            output_tool
        )));
    }
    serde_json::from_str(&body).map_err(|e| {
        reject(format!(
            "The reply is not valid JSON ({}). Submit the result by calling the `{}` tool.",
            e, output_tool
        ))
    })
}

fn reject(message: String) -> ValidationFailure {
    ValidationFailure::new(
        ValidationIssue::Message(message),
        OUTPUT_FORMAT_LAYER,
        OUTPUT_FORMAT_DESCRIPTION,
    )
}

fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().skip(1).collect();
    if lines.last().is_some_and(|line| line.trim() == "```") {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}
