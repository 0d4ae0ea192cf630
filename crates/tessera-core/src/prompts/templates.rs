//! Template-backed prompt builder

use super::template::{Bindings, Placeholder, Template};
use super::{PromptBuilder, PromptError};
use crate::agent::ExecutionContext;
use crate::error::PromptKind;
use crate::validation::ValidationFailure;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Prompt builder made of three `{{placeholder}}` templates
///
/// Templates may use `{{input}}`, `{{attempt}}` and `{{max_attempts}}`; the
/// error template may also use `{{error}}`, which expands to the rendered
/// validation failure. Templates are checked when constructed so a bad
/// template never reaches an execution.
#[derive(Debug, Clone)]
pub struct TemplatePrompts {
    system: Template,
    user: Template,
    error: Template,
}

impl TemplatePrompts {
    pub fn new(system: &str, user: &str, error: &str) -> Result<Self, PromptError> {
        Ok(Self {
            system: Template::parse(PromptKind::System, system)?,
            user: Template::parse(PromptKind::User, user)?,
            error: Template::parse(PromptKind::Error, error)?,
        })
    }

    pub fn from_files(
        system: impl AsRef<Path>,
        user: impl AsRef<Path>,
        error: impl AsRef<Path>,
    ) -> Result<Self, PromptError> {
        Self::new(
            &read(PromptKind::System, system.as_ref())?,
            &read(PromptKind::User, user.as_ref())?,
            &read(PromptKind::Error, error.as_ref())?,
        )
    }

    /// Default corrective template: the failure, then a request to resubmit
    pub fn default_error_template() -> &'static str {
        "Your previous output was rejected.\n\n{{error}}\n\n\
         Fix these problems and submit the corrected output. \
         This is attempt {{attempt}} of {{max_attempts}}."
    }

    /// Templates with [`default_error_template`](Self::default_error_template) as the error prompt
    pub fn with_default_error(system: &str, user: &str) -> Result<Self, PromptError> {
        Self::new(system, user, Self::default_error_template())
    }

    fn render<I: Serialize>(
        &self,
        kind: PromptKind,
        input: &I,
        context: &ExecutionContext,
        error: Option<&str>,
    ) -> Result<String, PromptError> {
        let template = match kind {
            PromptKind::System => &self.system,
            PromptKind::User => &self.user,
            PromptKind::Error => &self.error,
        };
        let input = if template.uses(Placeholder::Input) {
            render_input(kind, input)?
        } else {
            String::new()
        };
        Ok(template.render(&Bindings {
            input: &input,
            attempt: context.attempt,
            max_attempts: context.max_attempts,
            error,
        }))
    }
}

fn read(kind: PromptKind, path: &Path) -> Result<String, PromptError> {
    fs::read_to_string(path).map_err(|source| PromptError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Strings are inserted as-is, anything else as pretty JSON
fn render_input<I: Serialize>(kind: PromptKind, input: &I) -> Result<String, PromptError> {
    let value = serde_json::to_value(input).map_err(|e| PromptError::Render {
        kind,
        message: e.to_string(),
    })?;
    match value {
        Value::String(s) => Ok(s),
        other => serde_json::to_string_pretty(&other).map_err(|e| PromptError::Render {
            kind,
            message: e.to_string(),
        }),
    }
}

#[async_trait]
impl<I> PromptBuilder<I> for TemplatePrompts
where
    I: Serialize + Send + Sync,
{
    async fn system_prompt(
        &self,
        input: &I,
        context: &ExecutionContext,
    ) -> Result<String, PromptError> {
        self.render(PromptKind::System, input, context, None)
    }

    async fn user_prompt(
        &self,
        input: &I,
        context: &ExecutionContext,
    ) -> Result<String, PromptError> {
        self.render(PromptKind::User, input, context, None)
    }

    async fn error_prompt(
        &self,
        input: &I,
        failure: &ValidationFailure,
        context: &ExecutionContext,
    ) -> Result<String, PromptError> {
        let feedback = failure.to_prompt();
        self.render(PromptKind::Error, input, context, Some(&feedback))
    }
}
