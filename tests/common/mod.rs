#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::{Arc, Once};
use tessera::agent::AgentDefinitionBuilder;
use tessera::prelude::*;
use tessera::testing::ScriptedProvider;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tessera_core=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn point_schema() -> tessera::validation::ValidationSchema {
    SchemaBuilder::new().number("x").build()
}

/// Agent that must submit `{ "x": <number> }`
pub fn point_agent<R, A>() -> AgentDefinitionBuilder<String, R, A>
where
    R: Default + Send + Sync + 'static,
    A: Default + Send + Sync + 'static,
{
    AgentDefinition::builder("points", "Produces a point")
        .model(ModelConfig::new("test-model"))
        .prompts(
            TemplatePrompts::with_default_error("You produce points.", "Input: {{input}}")
                .unwrap(),
        )
        .output_tool(OutputTool::from_schema("submit_point", "Submit the point", &point_schema()))
        .validator(SchemaValidator::new(point_schema()))
}

pub fn submit(x: Value) -> ModelResponse {
    ModelResponse::tool_calls(vec![ToolCall::new("out", "submit_point", json!({ "x": x }))])
}

pub fn scripted(responses: Vec<ModelResponse>) -> Arc<ScriptedProvider> {
    Arc::new(ScriptedProvider::new(responses))
}
