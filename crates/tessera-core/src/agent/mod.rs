//! Agent definitions and the engine that executes them

mod definition;
mod engine;
mod outcome;
mod state;
mod submission;

pub use definition::{AgentDefinition, AgentDefinitionBuilder};
pub use engine::Engine;
pub use outcome::{ExecutionFailure, ExecutionMetrics, ExecutionOutput, ExecutionRequest};
pub use state::{AgentState, ExecutionContext};
pub use submission::OUTPUT_FORMAT_LAYER;
