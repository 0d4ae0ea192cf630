//! Per-execution state threaded through attempts and tool reducers

use serde::{Deserialize, Serialize};

/// Where an execution currently is in its attempt and iteration budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Output-submission cycle, `1..=max_attempts`
    pub attempt: u32,
    pub max_attempts: u32,
    /// Model call within the current attempt, reset to 1 each attempt
    pub iteration: u32,
    pub max_iterations: u32,
}

impl ExecutionContext {
    /// Context at iteration 1 of `attempt`
    pub fn new(attempt: u32, max_attempts: u32, max_iterations: u32) -> Self {
        Self {
            attempt,
            max_attempts,
            iteration: 1,
            max_iterations,
        }
    }

    pub fn is_first_attempt(&self) -> bool {
        self.attempt == 1
    }

    pub fn is_last_attempt(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    pub(crate) fn next_attempt(self) -> Self {
        Self::new(self.attempt + 1, self.max_attempts, self.max_iterations)
    }
}

/// State owned by one execution
///
/// `run` survives across attempts; `attempt` is rebuilt from the
/// definition's factory at the start of every attempt. Reducers take the
/// whole value and hand back a full replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState<R, A> {
    pub context: ExecutionContext,
    pub run: R,
    pub attempt: A,
}

impl<R, A> AgentState<R, A> {
    pub fn new(context: ExecutionContext, run: R, attempt: A) -> Self {
        Self {
            context,
            run,
            attempt,
        }
    }

    /// Swap in a new run state, keeping context and attempt state
    pub fn with_run(self, run: R) -> Self {
        Self { run, ..self }
    }

    pub fn with_attempt(self, attempt: A) -> Self {
        Self { attempt, ..self }
    }
}
