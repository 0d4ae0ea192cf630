//! Helper tools and the reducer protocol behind them

use super::types::ToolDescriptor;
use crate::agent::AgentState;
use crate::validation::ValidationSchema;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What a successful reduction produces
#[derive(Debug, Clone, PartialEq)]
pub struct ToolTransition<R, A> {
    /// Complete replacement for the execution state
    pub state: AgentState<R, A>,
    /// Sent back to the model as the tool result
    pub result: Value,
}

impl<R, A> ToolTransition<R, A> {
    pub fn new(state: AgentState<R, A>, result: Value) -> Self {
        Self { state, result }
    }
}

/// Pure state transition for one helper tool
///
/// The same state and input must always give the same answer. An `Err` is
/// reported to the model as a tool error and the engine keeps the state it
/// had before the call.
pub trait ToolReducer<R, A>: Send + Sync {
    fn reduce(
        &self,
        state: AgentState<R, A>,
        input: &Value,
    ) -> Result<ToolTransition<R, A>, String>;
}

impl<R, A, F> ToolReducer<R, A> for F
where
    F: Fn(AgentState<R, A>, &Value) -> Result<ToolTransition<R, A>, String> + Send + Sync,
{
    fn reduce(
        &self,
        state: AgentState<R, A>,
        input: &Value,
    ) -> Result<ToolTransition<R, A>, String> {
        self(state, input)
    }
}

/// A tool the model may call before submitting output
pub struct HelperTool<R, A> {
    name: String,
    description: String,
    input_schema: ValidationSchema,
    reducer: Arc<dyn ToolReducer<R, A>>,
}

impl<R, A> HelperTool<R, A> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: ValidationSchema,
        reducer: impl ToolReducer<R, A> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            reducer: Arc::new(reducer),
        }
    }

    /// Helper tool backed by a closure reducer
    pub fn from_fn<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: ValidationSchema,
        reduce: F,
    ) -> Self
    where
        F: Fn(AgentState<R, A>, &Value) -> Result<ToolTransition<R, A>, String>
            + Send
            + Sync
            + 'static,
    {
        Self::new(name, description, input_schema, reduce)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &ValidationSchema {
        &self.input_schema
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.input_schema.to_json_schema(),
        }
    }

    /// Check `input` against the tool's schema, then reduce
    pub fn invoke(
        &self,
        state: AgentState<R, A>,
        input: &Value,
    ) -> Result<ToolTransition<R, A>, String> {
        self.input_schema
            .check(input)
            .map_err(|err| format!("Invalid arguments for tool '{}': {}", self.name, err))?;
        self.reducer.reduce(state, input)
    }
}

impl<R, A> Clone for HelperTool<R, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            reducer: Arc::clone(&self.reducer),
        }
    }
}

impl<R, A> fmt::Debug for HelperTool<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
