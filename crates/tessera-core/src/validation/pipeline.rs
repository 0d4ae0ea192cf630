//! Ordered, fail-fast validation pipeline

use super::layer::Validator;
use super::outcome::{ValidationFailure, ValidationOutcome};
use crate::agent::ExecutionContext;
use crate::hooks::{ExecutionCallbacks, ValidationCompleteEvent, ValidationStartEvent};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// The pipeline stopped because the execution was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("validation interrupted by cancellation")]
pub struct Interrupted;

/// Validators in declaration order
#[derive(Clone, Default)]
pub struct ValidationPipeline {
    layers: Vec<Arc<dyn Validator>>,
}

/// Per-run context the pipeline reports through
pub struct PipelineRun<'a> {
    pub execution_id: Uuid,
    pub callbacks: &'a ExecutionCallbacks,
    pub cancellation: &'a CancellationToken,
}

impl ValidationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Arc<dyn Validator>) {
        self.layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Arc<dyn Validator>] {
        &self.layers
    }

    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Run every layer in order until one rejects `output`
    ///
    /// Later layers never see an output an earlier layer rejected. Each
    /// layer races `run.cancellation`; a cancelled run yields
    /// [`Interrupted`] and no outcome.
    pub async fn run(
        &self,
        output: Value,
        context: &ExecutionContext,
        run: &PipelineRun<'_>,
    ) -> Result<ValidationOutcome, Interrupted> {
        for layer in &self.layers {
            run.callbacks.validation_start(|| ValidationStartEvent {
                execution_id: run.execution_id,
                attempt: context.attempt,
                validator_name: layer.name().to_string(),
                validator_kind: layer.kind(),
            });
            debug!(validator = layer.name(), attempt = context.attempt, "Running validation layer");

            let started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = run.cancellation.cancelled() => return Err(Interrupted),
                result = layer.validate(&output, context) => result,
            };
            let failure = result
                .err()
                .map(|issue| ValidationFailure::new(issue, layer.name(), layer.description()));

            run.callbacks.validation_complete(|| ValidationCompleteEvent {
                execution_id: run.execution_id,
                attempt: context.attempt,
                validator_name: layer.name().to_string(),
                failure: failure.clone(),
                duration: started.elapsed(),
            });

            if let Some(failure) = failure {
                debug!(
                    validator = layer.name(),
                    "Validation layer rejected output: {}", failure.issue
                );
                return Ok(ValidationOutcome::Invalid(failure));
            }
        }
        Ok(ValidationOutcome::Valid(output))
    }
}

impl fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
