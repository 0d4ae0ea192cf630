//! Model-facing types: the provider trait and the conversation it receives

mod messages;
mod provider;

pub use messages::{Conversation, Message, Role};
pub use provider::{ModelError, ModelProvider, ModelRequest, ModelResponse, TokenUsage};
