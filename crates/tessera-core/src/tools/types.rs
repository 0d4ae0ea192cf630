//! Tool calls and the descriptors advertised to the model

use crate::validation::ValidationSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id, echoed back in the tool result
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Name, description and JSON Schema parameters of one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// The tool the model calls to submit its final output
///
/// Its arguments are the candidate output handed to validation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTool {
    descriptor: ToolDescriptor,
}

impl OutputTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Output tool whose parameters are rendered from `schema`
    pub fn from_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: &ValidationSchema,
    ) -> Self {
        Self::new(name, description, schema.to_json_schema())
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn description(&self) -> &str {
        &self.descriptor.description
    }

    pub fn parameters(&self) -> &Value {
        &self.descriptor.parameters
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }
}
