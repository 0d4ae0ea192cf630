//! Tessera core
//!
//! Drives a language model to produce a JSON output that passes a layered
//! validation pipeline, feeding each rejection back as a corrective prompt
//! until the output validates or the attempt budget is spent.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tessera_core::prelude::*;
//!
//! # async fn run(provider: Arc<dyn ModelProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! let schema = SchemaBuilder::new().number("x").build();
//! let definition: AgentDefinition<String, (), ()> =
//!     AgentDefinition::builder("points", "Produces a point")
//!         .model(ModelConfig::new("claude-sonnet-4"))
//!         .prompts(TemplatePrompts::with_default_error("You produce points.", "{{input}}")?)
//!         .output_tool(OutputTool::from_schema("submit_point", "Submit the point", &schema))
//!         .validator(SchemaValidator::new(schema))
//!         .build()
//!         .map_err(|errors| format!("{} configuration errors", errors.len()))?;
//!
//! let output = Engine::new(provider)
//!     .execute(&definition, ExecutionRequest::new("origin".to_string()))
//!     .await?;
//! println!("{} after {} attempt(s)", output.output, output.attempts);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod hooks;
pub mod llm;
pub mod prompts;
pub mod testing;
pub mod tools;
pub mod validation;

pub use agent::{
    AgentDefinition, AgentDefinitionBuilder, AgentState, Engine, ExecutionContext, ExecutionFailure,
    ExecutionMetrics, ExecutionOutput, ExecutionRequest,
};
pub use config::{AgentSettings, ConfigError, ModelConfig, ModelPricing, ObservabilityConfig};
pub use error::{AgentError, AgentResult, ErrorCategory, Severity};
pub use hooks::{ExecutionCallbacks, HookKind};
pub use llm::{ModelError, ModelProvider, ModelRequest, ModelResponse};
pub use prompts::{PromptBuilder, PromptError, TemplatePrompts};
pub use tools::{HelperTool, OutputTool, ToolReducer, ToolTransition};
pub use validation::{
    FnValidator, SchemaBuilder, SchemaValidator, ValidationFailure, ValidationIssue, Validator,
};

/// Everything needed to define and run an agent
pub mod prelude {
    pub use crate::agent::{
        AgentDefinition, AgentState, Engine, ExecutionContext, ExecutionFailure, ExecutionOutput,
        ExecutionRequest,
    };
    pub use crate::config::{AgentSettings, ModelConfig, ObservabilityConfig};
    pub use crate::error::AgentError;
    pub use crate::hooks::ExecutionCallbacks;
    pub use crate::llm::{ModelProvider, ModelResponse};
    pub use crate::prompts::TemplatePrompts;
    pub use crate::tools::{HelperTool, OutputTool, ToolCall, ToolTransition};
    pub use crate::validation::{
        FieldSchema, FieldType, FnValidator, SchemaBuilder, SchemaValidator, SemanticIssue,
        ValidationIssue, Validator,
    };
}
