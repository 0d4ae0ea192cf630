//! Attempt/validation state machine
//!
//! One execution walks `prompt -> model call -> (tool round trip)* ->
//! submitted output -> validation` per attempt, feeding each rejection back
//! as an error prompt until an output validates or the attempt budget runs
//! out.

use super::definition::AgentDefinition;
use super::outcome::{ExecutionFailure, ExecutionMetrics, ExecutionOutput, ExecutionRequest};
use super::state::{AgentState, ExecutionContext};
use super::submission::read_text_output;
use crate::error::{AgentError, PromptKind};
use crate::hooks::{
    AttemptCompleteEvent, AttemptStartEvent, ExecutionCallbacks, FailureEvent, SuccessEvent,
    ToolCallEvent, ToolResultEvent,
};
use crate::llm::{Conversation, Message, ModelProvider, ModelRequest, ModelResponse, TokenUsage};
use crate::prompts::PromptError;
use crate::tools::{ToolCall, ToolTransition};
use crate::validation::{PipelineRun, ValidationFailure, ValidationOutcome};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, error, field, info, instrument, warn};
use uuid::Uuid;

/// Runs agent definitions against a model provider
///
/// The engine holds no per-execution state, so one engine can run any
/// number of executions at once.
#[derive(Clone)]
pub struct Engine {
    provider: Arc<dyn ModelProvider>,
}

impl Engine {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn ModelProvider> {
        &self.provider
    }

    /// Drive `definition` until an output validates or execution stops
    ///
    /// Stops on: a valid output, an exhausted attempt budget, a fatal
    /// model/prompt/iteration error, or cancellation of
    /// `request.cancellation`.
    #[instrument(
        name = "agent_execution",
        skip_all,
        fields(agent = %definition.name(), execution_id = field::Empty)
    )]
    pub async fn execute<I, R, A>(
        &self,
        definition: &AgentDefinition<I, R, A>,
        request: ExecutionRequest<I, R>,
    ) -> Result<ExecutionOutput<R>, ExecutionFailure<R>>
    where
        I: Send + Sync,
        R: Clone + Send + Sync,
        A: Clone + Send + Sync,
    {
        let ExecutionRequest {
            input,
            initial_run_state,
            callbacks,
            cancellation,
        } = request;
        let execution_id = Uuid::new_v4();
        Span::current().record("execution_id", field::display(execution_id));

        let run_state = initial_run_state.unwrap_or_else(|| definition.initial_run_state());
        let execution = Execution {
            definition,
            provider: self.provider.as_ref(),
            input,
            callbacks,
            cancellation,
            execution_id,
            conversation: Conversation::new(),
            run_state,
            usage: TokenUsage::default(),
            errors: Vec::new(),
            started: Instant::now(),
        };
        execution.run().await
    }
}

/// How one attempt ended before validation
enum Step {
    /// Candidate output, still to be validated
    Submitted(Value),
    /// Rejected before reaching the pipeline (unreadable text reply)
    Rejected(ValidationFailure),
    Cancelled,
    Fatal(AgentError),
}

struct Execution<'a, I, R, A> {
    definition: &'a AgentDefinition<I, R, A>,
    provider: &'a dyn ModelProvider,
    input: I,
    callbacks: ExecutionCallbacks,
    cancellation: CancellationToken,
    execution_id: Uuid,
    conversation: Conversation,
    /// Run state as of the last committed transition
    run_state: R,
    usage: TokenUsage,
    errors: Vec<AgentError>,
    started: Instant,
}

impl<I, R, A> Execution<'_, I, R, A>
where
    I: Send + Sync,
    R: Clone + Send + Sync,
    A: Clone + Send + Sync,
{
    async fn run(mut self) -> Result<ExecutionOutput<R>, ExecutionFailure<R>> {
        let definition = self.definition;
        let mut context = ExecutionContext::new(
            1,
            definition.max_attempts(),
            definition.max_iterations(),
        );
        let mut last_failure: Option<ValidationFailure> = None;

        loop {
            if self.cancellation.is_cancelled() {
                return Err(self.cancelled(context.attempt));
            }

            self.callbacks.attempt_start(|| AttemptStartEvent {
                execution_id: self.execution_id,
                agent_name: definition.name().to_string(),
                attempt: context.attempt,
                max_attempts: context.max_attempts,
            });
            info!(
                attempt = context.attempt,
                max_attempts = context.max_attempts,
                "Starting attempt"
            );
            let attempt_started = Instant::now();

            let system_prompt = match self.open_attempt(&context, last_failure.as_ref()).await {
                Ok(prompt) => prompt,
                Err(error) => return Err(self.fail(context.attempt, error)),
            };

            let state = AgentState::new(
                context,
                self.run_state.clone(),
                definition.initial_attempt_state(),
            );
            let (state, step) = self.run_attempt(&system_prompt, state).await;
            self.run_state = state.run;

            let failure = match step {
                Step::Cancelled => return Err(self.cancelled(context.attempt)),
                Step::Fatal(error) => return Err(self.fail(context.attempt, error)),
                Step::Rejected(failure) => failure,
                Step::Submitted(output) => {
                    let pipeline_run = PipelineRun {
                        execution_id: self.execution_id,
                        callbacks: &self.callbacks,
                        cancellation: &self.cancellation,
                    };
                    let verdict = definition
                        .validators()
                        .run(output, &state.context, &pipeline_run)
                        .await;
                    match verdict {
                        Err(_) => return Err(self.cancelled(context.attempt)),
                        Ok(ValidationOutcome::Valid(output)) => {
                            self.callbacks.attempt_complete(|| AttemptCompleteEvent {
                                execution_id: self.execution_id,
                                attempt: context.attempt,
                                failure: None,
                                duration: attempt_started.elapsed(),
                            });
                            return Ok(self.succeed(output, context.attempt));
                        }
                        Ok(ValidationOutcome::Invalid(failure)) => failure,
                    }
                }
            };

            warn!(
                attempt = context.attempt,
                validator = %failure.validator_name,
                "Output rejected: {}",
                failure.issue
            );
            self.callbacks.attempt_complete(|| AttemptCompleteEvent {
                execution_id: self.execution_id,
                attempt: context.attempt,
                failure: Some(failure.clone()),
                duration: attempt_started.elapsed(),
            });
            self.errors.push(AgentError::OutputInvalid {
                attempt: context.attempt,
                failure: failure.clone(),
            });

            if context.is_last_attempt() {
                let error = AgentError::MaxAttemptsExceeded {
                    max_attempts: context.max_attempts,
                    last_failure: failure,
                };
                return Err(self.fail(context.attempt, error));
            }
            last_failure = Some(failure);
            context = context.next_attempt();
        }
    }

    /// Build this attempt's prompts and append the opening user turn
    async fn open_attempt(
        &mut self,
        context: &ExecutionContext,
        last_failure: Option<&ValidationFailure>,
    ) -> Result<String, AgentError> {
        let prompts = self.definition.prompts();
        let system = prompts
            .system_prompt(&self.input, context)
            .await
            .map_err(|e| prompt_error(PromptKind::System, e))?;
        let opening = match last_failure {
            None => prompts
                .user_prompt(&self.input, context)
                .await
                .map_err(|e| prompt_error(PromptKind::User, e))?,
            Some(failure) => prompts
                .error_prompt(&self.input, failure, context)
                .await
                .map_err(|e| prompt_error(PromptKind::Error, e))?,
        };
        self.conversation.push(Message::user(opening));
        Ok(system)
    }

    /// Call the model until it submits an output
    async fn run_attempt(
        &mut self,
        system_prompt: &str,
        mut state: AgentState<R, A>,
    ) -> (AgentState<R, A>, Step) {
        loop {
            let context = state.context;
            if context.iteration > context.max_iterations {
                let error = AgentError::MaxIterationsExceeded {
                    attempt: context.attempt,
                    max_iterations: context.max_iterations,
                };
                return (state, Step::Fatal(error));
            }
            debug!(attempt = context.attempt, iteration = context.iteration, "Calling model");

            let model = self.definition.model();
            let request = ModelRequest {
                provider: &model.provider,
                model: &model.model,
                temperature: model.temperature,
                max_tokens: model.max_tokens,
                system_prompt,
                messages: self.conversation.messages(),
                tools: self.definition.tool_descriptors(),
                cancellation: &self.cancellation,
            };
            let response = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => return (state, Step::Cancelled),
                response = self.provider.invoke(request) => response,
            };
            let ModelResponse {
                text,
                mut tool_calls,
                usage,
            } = match response {
                Ok(response) => response,
                Err(e) => return (state, Step::Fatal(e.into())),
            };
            if let Some(usage) = usage {
                self.usage += usage;
            }
            self.conversation.push(Message::assistant(
                text.clone().unwrap_or_default(),
                tool_calls.clone(),
            ));

            let output_tool = self.definition.output_tool().name();
            if let Some(index) = tool_calls.iter().position(|call| call.name == output_tool) {
                // An output submission wins over helper calls in the same turn.
                for (position, call) in tool_calls.iter().enumerate() {
                    if position == index {
                        self.conversation.push(Message::tool_result(
                            &call.id,
                            "Output received for validation.",
                        ));
                    } else {
                        debug!(
                            tool = %call.name,
                            "Ignoring tool call made alongside output submission"
                        );
                        self.conversation.push(Message::tool_error(
                            &call.id,
                            "Not executed: an output was submitted in the same turn.",
                        ));
                    }
                }
                let submitted = tool_calls.swap_remove(index);
                return (state, Step::Submitted(submitted.arguments));
            }

            if tool_calls.is_empty() {
                let step = match read_text_output(text.as_deref(), output_tool) {
                    Ok(output) => Step::Submitted(output),
                    Err(failure) => Step::Rejected(failure),
                };
                return (state, step);
            }

            for call in &tool_calls {
                state = self.dispatch(call, state);
            }
            state.context.iteration += 1;
        }
    }

    /// Run one helper tool call, answering the model either way
    fn dispatch(&mut self, call: &ToolCall, state: AgentState<R, A>) -> AgentState<R, A> {
        let context = state.context;
        self.callbacks.tool_call(|| ToolCallEvent {
            execution_id: self.execution_id,
            attempt: context.attempt,
            iteration: context.iteration,
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            arguments: call.arguments.clone(),
        });
        debug!(tool = %call.name, call_id = %call.id, "Dispatching tool call");

        let (state, result, is_error) = match self.definition.helper_tool(&call.name) {
            None => {
                warn!(tool = %call.name, "Model called an unknown tool");
                let message = format!("Unknown tool '{}'", call.name);
                (state, Value::String(message), true)
            }
            Some(tool) => {
                let before = state.clone();
                match tool.invoke(state, &call.arguments) {
                    Ok(ToolTransition {
                        state: mut next,
                        result,
                    }) => {
                        next.context = context;
                        (next, result, false)
                    }
                    Err(message) => {
                        warn!(tool = %call.name, "Tool call failed: {}", message);
                        (before, Value::String(message), true)
                    }
                }
            }
        };

        let content = match &result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.conversation.push(if is_error {
            Message::tool_error(&call.id, content)
        } else {
            Message::tool_result(&call.id, content)
        });
        self.callbacks.tool_result(|| ToolResultEvent {
            execution_id: self.execution_id,
            attempt: context.attempt,
            iteration: context.iteration,
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            result,
            is_error,
        });
        state
    }

    fn succeed(self, output: Value, attempts: u32) -> ExecutionOutput<R> {
        let definition = self.definition;
        let metrics = ExecutionMetrics::collect(
            definition.observability(),
            definition.model().pricing.as_ref(),
            attempts,
            self.started.elapsed(),
            self.usage,
        );
        info!(attempts, "Output validated");
        self.callbacks.success(|| SuccessEvent {
            execution_id: self.execution_id,
            output: output.clone(),
            attempts,
            metrics: metrics.clone(),
        });
        ExecutionOutput {
            execution_id: self.execution_id,
            output,
            attempts,
            metrics,
            run_state: self.run_state,
            conversation: self.conversation,
        }
    }

    fn fail(mut self, attempts: u32, error: AgentError) -> ExecutionFailure<R> {
        error!(code = error.code(), attempts, "Execution failed: {}", error);
        self.errors.push(error);
        self.callbacks.failure(|| FailureEvent {
            execution_id: self.execution_id,
            attempts,
            errors: self.errors.clone(),
            cancelled: false,
        });
        ExecutionFailure::Failed {
            errors: self.errors,
            attempts,
            run_state: self.run_state,
        }
    }

    fn cancelled(self, attempts: u32) -> ExecutionFailure<R> {
        warn!(attempts, "Execution cancelled");
        self.callbacks.failure(|| FailureEvent {
            execution_id: self.execution_id,
            attempts,
            errors: Vec::new(),
            cancelled: true,
        });
        ExecutionFailure::Cancelled {
            attempts,
            run_state: self.run_state,
        }
    }
}

fn prompt_error(kind: PromptKind, error: PromptError) -> AgentError {
    AgentError::PromptGeneration {
        kind,
        message: error.to_string(),
    }
}
