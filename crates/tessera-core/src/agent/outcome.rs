//! What an execution hands back to the caller

use crate::config::{ModelPricing, ObservabilityConfig};
use crate::error::AgentError;
use crate::hooks::ExecutionCallbacks;
use crate::llm::{Conversation, TokenUsage};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Input and per-execution options for [`Engine::execute`](super::Engine::execute)
pub struct ExecutionRequest<I, R> {
    pub input: I,
    /// Overrides the definition's initial run state factory
    pub initial_run_state: Option<R>,
    pub callbacks: ExecutionCallbacks,
    pub cancellation: CancellationToken,
}

impl<I, R> ExecutionRequest<I, R> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            initial_run_state: None,
            callbacks: ExecutionCallbacks::default(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_run_state(mut self, run_state: R) -> Self {
        self.initial_run_state = Some(run_state);
        self
    }

    pub fn with_callbacks(mut self, callbacks: ExecutionCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// Metrics collected for the enabled observability flags
///
/// A field is `None` when its flag is off. `cost` also stays `None` when the
/// model has no pricing configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionMetrics {
    pub attempts: Option<u32>,
    pub latency: Option<Duration>,
    pub tokens: Option<TokenUsage>,
    /// USD
    pub cost: Option<f64>,
}

impl ExecutionMetrics {
    pub(crate) fn collect(
        flags: &ObservabilityConfig,
        pricing: Option<&ModelPricing>,
        attempts: u32,
        latency: Duration,
        usage: TokenUsage,
    ) -> Self {
        Self {
            attempts: flags.track_attempts.then_some(attempts),
            latency: flags.track_latency.then_some(latency),
            tokens: flags.track_tokens.then_some(usage),
            cost: if flags.track_cost {
                pricing.map(|p| p.cost(&usage))
            } else {
                None
            },
        }
    }
}

/// A validated output
#[derive(Debug, Clone)]
pub struct ExecutionOutput<R> {
    pub execution_id: Uuid,
    pub output: Value,
    /// Attempts used, including the successful one
    pub attempts: u32,
    pub metrics: ExecutionMetrics,
    pub run_state: R,
    pub conversation: Conversation,
}

impl<R> ExecutionOutput<R> {
    /// Deserialize the output into a typed value
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.output)
    }
}

/// Why an execution produced no output
#[derive(Debug, Clone)]
pub enum ExecutionFailure<R> {
    /// The cancellation token fired; `run_state` is the last committed state
    Cancelled { attempts: u32, run_state: R },
    /// Every error raised, in order; the last one ended the execution
    Failed {
        errors: Vec<AgentError>,
        attempts: u32,
        run_state: R,
    },
}

impl<R> ExecutionFailure<R> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn errors(&self) -> &[AgentError] {
        match self {
            Self::Cancelled { .. } => &[],
            Self::Failed { errors, .. } => errors,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Cancelled { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn run_state(&self) -> &R {
        match self {
            Self::Cancelled { run_state, .. } | Self::Failed { run_state, .. } => run_state,
        }
    }

    pub fn into_run_state(self) -> R {
        match self {
            Self::Cancelled { run_state, .. } | Self::Failed { run_state, .. } => run_state,
        }
    }
}

impl<R> fmt::Display for ExecutionFailure<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled { attempts, .. } => {
                write!(f, "Execution cancelled during attempt {}", attempts)
            }
            Self::Failed { errors, attempts, .. } => {
                write!(f, "Execution failed after {} attempt(s)", attempts)?;
                if let Some(last) = errors.last() {
                    write!(f, ": {}", last)?;
                }
                Ok(())
            }
        }
    }
}

impl<R: fmt::Debug> std::error::Error for ExecutionFailure<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_metrics_respect_flags() {
        let flags = ObservabilityConfig {
            track_tokens: true,
            track_cost: true,
            ..ObservabilityConfig::default()
        };
        let usage = TokenUsage::new(2000, 1000);
        let pricing = ModelPricing::new(1.0, 2.0);

        let metrics =
            ExecutionMetrics::collect(&flags, Some(&pricing), 2, Duration::from_millis(5), usage);
        assert_eq!(metrics.attempts, None);
        assert_eq!(metrics.latency, None);
        assert_eq!(metrics.tokens, Some(usage));
        assert_eq!(metrics.cost, Some(4.0));

        let unpriced = ExecutionMetrics::collect(&flags, None, 2, Duration::ZERO, usage);
        assert_eq!(unpriced.cost, None);
    }

    #[test]
    fn test_parse_output() {
        #[derive(Deserialize)]
        struct Point {
            x: f64,
        }

        let output = ExecutionOutput {
            execution_id: Uuid::new_v4(),
            output: json!({ "x": 1.5 }),
            attempts: 1,
            metrics: ExecutionMetrics::default(),
            run_state: (),
            conversation: Conversation::new(),
        };
        assert_eq!(output.parse::<Point>().unwrap().x, 1.5);
    }

    #[test]
    fn test_failure_accessors() {
        let failure: ExecutionFailure<u32> = ExecutionFailure::Failed {
            errors: vec![AgentError::MaxIterationsExceeded {
                attempt: 1,
                max_iterations: 2,
            }],
            attempts: 1,
            run_state: 7,
        };
        assert!(!failure.is_cancelled());
        assert_eq!(failure.errors().len(), 1);
        assert_eq!(*failure.run_state(), 7);
        assert!(
            failure
                .to_string()
                .starts_with("Execution failed after 1 attempt(s): Attempt 1 exceeded")
        );

        let cancelled: ExecutionFailure<u32> = ExecutionFailure::Cancelled {
            attempts: 2,
            run_state: 3,
        };
        assert!(cancelled.is_cancelled());
        assert!(cancelled.errors().is_empty());
        assert_eq!(cancelled.into_run_state(), 3);
    }
}
