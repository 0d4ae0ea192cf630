//! `{{placeholder}}` templates, parsed once and rendered per attempt

use super::PromptError;
use crate::error::PromptKind;

/// Values a template may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placeholder {
    Input,
    Attempt,
    MaxAttempts,
    /// Only meaningful in the error template
    Error,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "input" => Some(Self::Input),
            "attempt" => Some(Self::Attempt),
            "max_attempts" => Some(Self::MaxAttempts),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Value(Placeholder),
}

/// Resolved values for one render
pub(crate) struct Bindings<'a> {
    pub input: &'a str,
    pub attempt: u32,
    pub max_attempts: u32,
    pub error: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub(crate) fn parse(kind: PromptKind, source: &str) -> Result<Self, PromptError> {
        if source.trim().is_empty() {
            return Err(PromptError::Empty { kind });
        }

        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;
        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let Some(close) = after_open.find("}}") else {
                return Err(PromptError::Unterminated {
                    kind,
                    offset: offset + open,
                });
            };
            let name = after_open[..close].trim();
            let placeholder =
                Placeholder::parse(name).ok_or_else(|| PromptError::UnknownPlaceholder {
                    kind,
                    name: name.to_string(),
                })?;
            if placeholder == Placeholder::Error && kind != PromptKind::Error {
                return Err(PromptError::PlaceholderNotAllowed {
                    kind,
                    name: name.to_string(),
                });
            }
            segments.push(Segment::Value(placeholder));

            let consumed = open + 2 + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    pub(crate) fn uses(&self, placeholder: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|segment| *segment == Segment::Value(placeholder))
    }

    pub(crate) fn render(&self, bindings: &Bindings<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Value(Placeholder::Input) => out.push_str(bindings.input),
                Segment::Value(Placeholder::Attempt) => out.push_str(&bindings.attempt.to_string()),
                Segment::Value(Placeholder::MaxAttempts) => {
                    out.push_str(&bindings.max_attempts.to_string())
                }
                Segment::Value(Placeholder::Error) => {
                    out.push_str(bindings.error.unwrap_or_default())
                }
            }
        }
        out
    }
}
