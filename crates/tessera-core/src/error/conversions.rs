//! From implementations for AgentError

use super::types::AgentError;
use crate::llm::ModelError;

impl From<ModelError> for AgentError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Api { message, status } => AgentError::ModelApi { message, status },
            ModelError::RateLimited {
                message,
                retry_after_secs,
            } => AgentError::RateLimited {
                message,
                retry_after_secs,
            },
            ModelError::TokenLimitExceeded { message } => {
                AgentError::TokenLimitExceeded { message }
            }
            ModelError::MalformedResponse { message } => AgentError::MalformedResponse { message },
        }
    }
}
