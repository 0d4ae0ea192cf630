//! Immutable, validated agent configuration

use crate::config::defaults::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_ITERATIONS};
use crate::config::{
    AgentSettings, MAX_TEMPERATURE, MIN_MAX_TOKENS, MIN_TEMPERATURE, ModelConfig,
    ObservabilityConfig,
};
use crate::error::AgentError;
use crate::prompts::PromptBuilder;
use crate::tools::{HelperTool, OutputTool, ToolDescriptor};
use crate::validation::{PatternError, ValidationPipeline, Validator};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

fn pattern_errors(
    owner: &str,
    errors: Vec<PatternError>,
) -> impl Iterator<Item = AgentError> + '_ {
    errors.into_iter().map(move |err| AgentError::InvalidPattern {
        owner: owner.to_string(),
        field: err.field,
        pattern: err.pattern,
        message: err.message,
    })
}

struct Inner<I, R, A> {
    name: String,
    description: String,
    model: ModelConfig,
    prompts: Arc<dyn PromptBuilder<I>>,
    output_tool: OutputTool,
    helper_tools: Vec<HelperTool<R, A>>,
    tool_descriptors: Vec<ToolDescriptor>,
    validators: ValidationPipeline,
    max_attempts: u32,
    max_iterations: u32,
    observability: ObservabilityConfig,
    initial_run_state: Factory<R>,
    initial_attempt_state: Factory<A>,
}

/// A checked agent configuration
///
/// `I` is the execution input, `R` the run state kept across attempts and
/// `A` the attempt state rebuilt for every attempt. Once built nothing can
/// change it; clones share the same frozen value, so one definition can
/// serve any number of concurrent executions.
pub struct AgentDefinition<I, R, A> {
    inner: Arc<Inner<I, R, A>>,
}

impl<I, R, A> Clone for AgentDefinition<I, R, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I, R, A> AgentDefinition<I, R, A>
where
    I: Send + Sync + 'static,
    R: Default + Send + Sync + 'static,
    A: Default + Send + Sync + 'static,
{
    pub fn builder(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> AgentDefinitionBuilder<I, R, A> {
        AgentDefinitionBuilder::new(name, description)
    }
}

impl<I, R, A> AgentDefinition<I, R, A>
where
    I: Send + Sync + 'static,
    R: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    /// Start a definition whose states are built by the given factories
    pub fn builder_with_state(
        name: impl Into<String>,
        description: impl Into<String>,
        run_state: impl Fn() -> R + Send + Sync + 'static,
        attempt_state: impl Fn() -> A + Send + Sync + 'static,
    ) -> AgentDefinitionBuilder<I, R, A> {
        AgentDefinitionBuilder::with_state(name, description, run_state, attempt_state)
    }
}

impl<I, R, A> AgentDefinition<I, R, A>
where
    I: Send + Sync,
{
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn description(&self) -> &str {
        &self.inner.description
    }

    pub fn model(&self) -> &ModelConfig {
        &self.inner.model
    }

    pub fn prompts(&self) -> &dyn PromptBuilder<I> {
        self.inner.prompts.as_ref()
    }

    pub fn output_tool(&self) -> &OutputTool {
        &self.inner.output_tool
    }

    pub fn helper_tools(&self) -> &[HelperTool<R, A>] {
        &self.inner.helper_tools
    }

    pub fn helper_tool(&self, name: &str) -> Option<&HelperTool<R, A>> {
        self.inner.helper_tools.iter().find(|tool| tool.name() == name)
    }

    /// Output tool first, then helper tools in declaration order
    pub fn tool_descriptors(&self) -> &[ToolDescriptor] {
        &self.inner.tool_descriptors
    }

    pub fn validators(&self) -> &ValidationPipeline {
        &self.inner.validators
    }

    pub fn max_attempts(&self) -> u32 {
        self.inner.max_attempts
    }

    pub fn max_iterations(&self) -> u32 {
        self.inner.max_iterations
    }

    pub fn observability(&self) -> &ObservabilityConfig {
        &self.inner.observability
    }

    pub fn initial_run_state(&self) -> R {
        (self.inner.initial_run_state)()
    }

    pub fn initial_attempt_state(&self) -> A {
        (self.inner.initial_attempt_state)()
    }
}

impl<I, R, A> fmt::Debug for AgentDefinition<I, R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentDefinition")
            .field("name", &self.inner.name)
            .field("model", &self.inner.model.model)
            .field("output_tool", &self.inner.output_tool.name())
            .field(
                "helper_tools",
                &self.inner.helper_tools.iter().map(HelperTool::name).collect::<Vec<_>>(),
            )
            .field("validators", &self.inner.validators)
            .field("max_attempts", &self.inner.max_attempts)
            .field("max_iterations", &self.inner.max_iterations)
            .finish()
    }
}

/// Collects an agent's parts and checks them all at once in [`build`](Self::build)
pub struct AgentDefinitionBuilder<I, R, A> {
    name: String,
    description: String,
    model: ModelConfig,
    prompts: Option<Arc<dyn PromptBuilder<I>>>,
    output_tool: Option<OutputTool>,
    helper_tools: Vec<HelperTool<R, A>>,
    validators: ValidationPipeline,
    max_attempts: u32,
    max_iterations: u32,
    observability: ObservabilityConfig,
    initial_run_state: Factory<R>,
    initial_attempt_state: Factory<A>,
}

impl<I, R, A> AgentDefinitionBuilder<I, R, A>
where
    I: Send + Sync + 'static,
    R: Default + Send + Sync + 'static,
    A: Default + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_state(name, description, R::default, A::default)
    }
}

impl<I, R, A> AgentDefinitionBuilder<I, R, A>
where
    I: Send + Sync + 'static,
    R: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    /// Builder for run and attempt states that have no `Default`
    pub fn with_state(
        name: impl Into<String>,
        description: impl Into<String>,
        run_state: impl Fn() -> R + Send + Sync + 'static,
        attempt_state: impl Fn() -> A + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            model: ModelConfig::default(),
            prompts: None,
            output_tool: None,
            helper_tools: Vec::new(),
            validators: ValidationPipeline::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            observability: ObservabilityConfig::default(),
            initial_run_state: Arc::new(run_state),
            initial_attempt_state: Arc::new(attempt_state),
        }
    }

    /// Apply loaded settings: model, retry budgets and observability flags
    pub fn settings(mut self, settings: AgentSettings) -> Self {
        self.model = settings.model;
        self.max_attempts = settings.validation.max_attempts;
        self.max_iterations = settings.validation.max_iterations;
        self.observability = settings.observability;
        self
    }

    pub fn model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn prompts(mut self, prompts: impl PromptBuilder<I> + 'static) -> Self {
        self.prompts = Some(Arc::new(prompts));
        self
    }

    pub fn output_tool(mut self, tool: OutputTool) -> Self {
        self.output_tool = Some(tool);
        self
    }

    pub fn helper_tool(mut self, tool: HelperTool<R, A>) -> Self {
        self.helper_tools.push(tool);
        self
    }

    /// Append a validation layer; layers run in the order added
    pub fn validator(self, validator: impl Validator + 'static) -> Self {
        self.shared_validator(Arc::new(validator))
    }

    pub fn shared_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn observability(mut self, observability: ObservabilityConfig) -> Self {
        self.observability = observability;
        self
    }

    pub fn initial_run_state(mut self, factory: impl Fn() -> R + Send + Sync + 'static) -> Self {
        self.initial_run_state = Arc::new(factory);
        self
    }

    pub fn initial_attempt_state(
        mut self,
        factory: impl Fn() -> A + Send + Sync + 'static,
    ) -> Self {
        self.initial_attempt_state = Arc::new(factory);
        self
    }

    /// Check every constraint and freeze the definition
    ///
    /// All violations are reported together, one error each.
    pub fn build(self) -> Result<AgentDefinition<I, R, A>, Vec<AgentError>> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push(AgentError::EmptyName);
        }
        let description = self.description.trim().to_string();
        if description.is_empty() {
            errors.push(AgentError::EmptyDescription);
        }
        if self.model.model.trim().is_empty() {
            errors.push(AgentError::EmptyModelName);
        }
        // NaN fails the range check too.
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.model.temperature) {
            errors.push(AgentError::TemperatureOutOfRange {
                value: self.model.temperature,
                min: MIN_TEMPERATURE,
                max: MAX_TEMPERATURE,
            });
        }
        if self.model.max_tokens < MIN_MAX_TOKENS {
            errors.push(AgentError::MaxTokensTooLow {
                value: self.model.max_tokens,
                min: MIN_MAX_TOKENS,
            });
        }
        if self.prompts.is_none() {
            errors.push(AgentError::MissingPrompts);
        }
        if self.output_tool.is_none() {
            errors.push(AgentError::MissingOutputTool);
        }
        if self.max_attempts < 1 {
            errors.push(AgentError::InvalidMaxAttempts {
                value: self.max_attempts,
            });
        }
        if self.max_iterations < 1 {
            errors.push(AgentError::InvalidMaxIterations {
                value: self.max_iterations,
            });
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut reported: HashSet<&str> = HashSet::new();
        if let Some(output) = &self.output_tool {
            seen.insert(output.name());
        }
        for tool in &self.helper_tools {
            if !seen.insert(tool.name()) && reported.insert(tool.name()) {
                errors.push(AgentError::DuplicateTool {
                    name: tool.name().to_string(),
                });
            }
        }

        for layer in self.validators.layers() {
            errors.extend(pattern_errors(layer.name(), layer.pattern_errors()));
        }
        for tool in &self.helper_tools {
            let found = tool.input_schema().pattern_errors();
            errors.extend(pattern_errors(tool.name(), found));
        }

        let (Some(prompts), Some(output_tool), true) =
            (self.prompts, self.output_tool, errors.is_empty())
        else {
            return Err(errors);
        };

        let tool_descriptors = std::iter::once(output_tool.descriptor().clone())
            .chain(self.helper_tools.iter().map(HelperTool::descriptor))
            .collect();

        Ok(AgentDefinition {
            inner: Arc::new(Inner {
                name,
                description,
                model: self.model,
                prompts,
                output_tool,
                helper_tools: self.helper_tools,
                tool_descriptors,
                validators: self.validators,
                max_attempts: self.max_attempts,
                max_iterations: self.max_iterations,
                observability: self.observability,
                initial_run_state: self.initial_run_state,
                initial_attempt_state: self.initial_attempt_state,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::TemplatePrompts;
    use crate::tools::ToolTransition;
    use crate::validation::{FieldSchema, FieldType, SchemaBuilder, SchemaValidator};
    use serde_json::json;

    type Definition = AgentDefinition<String, u32, ()>;

    fn prompts() -> TemplatePrompts {
        TemplatePrompts::with_default_error("You plot charts.", "Plot {{input}}").unwrap()
    }

    fn noop_tool(name: &str) -> HelperTool<u32, ()> {
        HelperTool::from_fn(name, "Does nothing", SchemaBuilder::new().build(), |state, _| {
            Ok(ToolTransition::new(state, json!(null)))
        })
    }

    fn valid_builder() -> AgentDefinitionBuilder<String, u32, ()> {
        Definition::builder("  charts ", "Builds chart specs")
            .model(ModelConfig::new("claude-sonnet-4"))
            .prompts(prompts())
            .output_tool(OutputTool::new(
                "submit_chart",
                "Submit the chart",
                json!({ "type": "object" }),
            ))
    }

    #[test]
    fn test_valid_definition() {
        let definition = valid_builder()
            .helper_tool(noop_tool("lookup"))
            .validator(SchemaValidator::new(SchemaBuilder::new().number("x").build()))
            .initial_run_state(|| 41)
            .build()
            .unwrap();

        assert_eq!(definition.name(), "charts");
        assert_eq!(definition.max_attempts(), 3);
        assert_eq!(definition.max_iterations(), 10);
        assert_eq!(definition.validators().len(), 1);
        assert_eq!(definition.initial_run_state(), 41);
        assert!(definition.helper_tool("lookup").is_some());
        let names: Vec<&str> = definition
            .tool_descriptors()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["submit_chart", "lookup"]);
    }

    #[test]
    fn test_all_violations_are_reported() {
        let errors = Definition::builder(" ", "")
            .model(ModelConfig::new("").with_temperature(3.0).with_max_tokens(0))
            .max_attempts(0)
            .max_iterations(0)
            .build()
            .unwrap_err();

        let codes: Vec<&str> = errors.iter().map(AgentError::code).collect();
        assert_eq!(
            codes,
            vec![
                "TESSERA_EMPTY_NAME",
                "TESSERA_EMPTY_DESCRIPTION",
                "TESSERA_EMPTY_MODEL_NAME",
                "TESSERA_TEMPERATURE_OUT_OF_RANGE",
                "TESSERA_MAX_TOKENS_TOO_LOW",
                "TESSERA_MISSING_PROMPTS",
                "TESSERA_MISSING_OUTPUT_TOOL",
                "TESSERA_INVALID_MAX_ATTEMPTS",
                "TESSERA_INVALID_MAX_ITERATIONS",
            ]
        );
        assert!(errors.iter().all(AgentError::is_construction_error));
    }

    #[test]
    fn test_single_violation_is_single_error() {
        let errors = valid_builder().max_attempts(0).build().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], AgentError::InvalidMaxAttempts { value: 0 }));
    }

    #[test]
    fn test_nan_temperature_is_rejected() {
        let errors = valid_builder()
            .model(ModelConfig::new("m").with_temperature(f32::NAN))
            .build()
            .unwrap_err();
        assert!(matches!(errors[0], AgentError::TemperatureOutOfRange { .. }));
    }

    #[test]
    fn test_duplicate_tool_names() {
        let errors = valid_builder()
            .helper_tool(noop_tool("lookup"))
            .helper_tool(noop_tool("lookup"))
            .helper_tool(noop_tool("lookup"))
            .helper_tool(noop_tool("submit_chart"))
            .build()
            .unwrap_err();

        let names: Vec<String> = errors
            .iter()
            .map(|e| match e {
                AgentError::DuplicateTool { name } => name.clone(),
                other => panic!("unexpected error {other}"),
            })
            .collect();
        assert_eq!(names, vec!["lookup", "submit_chart"]);
    }

    #[test]
    fn test_settings_apply() {
        let toml = "[model]\nmodel = \"m\"\ntemperature = 0.1\n\
                    [validation]\nmax_attempts = 1\nmax_iterations = 4";
        let settings = AgentSettings::from_toml_str(toml).unwrap();
        let definition = valid_builder().settings(settings).build().unwrap();
        assert_eq!(definition.model().model, "m");
        assert_eq!(definition.max_attempts(), 1);
        assert_eq!(definition.max_iterations(), 4);
    }

    #[test]
    fn test_clones_share_one_value() {
        let definition = valid_builder().build().unwrap();
        let clone = definition.clone();
        assert!(std::ptr::eq(definition.name(), clone.name()));
    }

    #[test]
    fn test_definition_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Definition>();
    }

    #[test]
    fn test_broken_patterns_fail_construction() {
        let output = SchemaBuilder::new()
            .field("x", FieldSchema::new(FieldType::String).pattern("("))
            .build();
        let input = SchemaBuilder::new()
            .field("query", FieldSchema::new(FieldType::String).pattern("[a-"))
            .build();
        let errors = valid_builder()
            .validator(SchemaValidator::new(output))
            .helper_tool(HelperTool::from_fn(
                "search",
                "Searches",
                input,
                |state: crate::agent::AgentState<u32, ()>, _: &serde_json::Value| {
                    Ok(ToolTransition::new(state, json!(null)))
                },
            ))
            .build()
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        match &errors[0] {
            AgentError::InvalidPattern { owner, field, pattern, .. } => {
                assert_eq!(owner, "schema");
                assert_eq!(field, "x");
                assert_eq!(pattern, "(");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            &errors[1],
            AgentError::InvalidPattern { owner, field, .. } if owner == "search" && field == "query"
        ));
    }

    #[test]
    fn test_states_without_default() {
        #[derive(Debug, PartialEq)]
        struct Budget {
            remaining: u32,
        }

        let definition: AgentDefinition<String, Budget, Budget> =
            AgentDefinition::builder_with_state(
                "charts",
                "Builds chart specs",
                || Budget { remaining: 5 },
                || Budget { remaining: 1 },
            )
            .model(ModelConfig::new("claude-sonnet-4"))
            .prompts(prompts())
            .output_tool(OutputTool::new(
                "submit_chart",
                "Submit",
                json!({ "type": "object" }),
            ))
            .build()
            .unwrap();

        assert_eq!(definition.initial_run_state(), Budget { remaining: 5 });
        assert_eq!(definition.initial_attempt_state(), Budget { remaining: 1 });
    }
}
