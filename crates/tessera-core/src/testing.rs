//! Deterministic model provider for tests and offline runs

use crate::llm::{Message, ModelError, ModelProvider, ModelRequest, ModelResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// A request as the provider saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub messages: Vec<Message>,
    /// Tool names in the order they were offered
    pub tools: Vec<String>,
}

struct Scripted {
    result: Result<ModelResponse, ModelError>,
    delay: Option<Duration>,
}

/// Replays queued replies in order and records every request
///
/// Once the script runs out every call fails with a malformed-response
/// error.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: impl IntoIterator<Item = ModelResponse>) -> Self {
        Self::from_results(responses.into_iter().map(Ok))
    }

    pub fn from_results(
        results: impl IntoIterator<Item = Result<ModelResponse, ModelError>>,
    ) -> Self {
        let script = results
            .into_iter()
            .map(|result| Scripted { result, delay: None })
            .collect();
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, response: ModelResponse) {
        self.script.lock().push_back(Scripted {
            result: Ok(response),
            delay: None,
        });
    }

    pub fn push_error(&self, error: ModelError) {
        self.script.lock().push_back(Scripted {
            result: Err(error),
            delay: None,
        });
    }

    /// Queue a reply that only arrives after `delay`
    pub fn push_delayed(&self, response: ModelResponse, delay: Duration) {
        self.script.lock().push_back(Scripted {
            result: Ok(response),
            delay: Some(delay),
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn invoke(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        self.requests.lock().push(RecordedRequest {
            model: request.model.to_string(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            system_prompt: request.system_prompt.to_string(),
            messages: request.messages.to_vec(),
            tools: request.tools.iter().map(|tool| tool.name.clone()).collect(),
        });

        let next = self.script.lock().pop_front();
        let Some(Scripted { result, delay }) = next else {
            return Err(ModelError::malformed("scripted provider has no replies left"));
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
