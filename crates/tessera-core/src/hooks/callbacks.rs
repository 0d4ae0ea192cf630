//! Caller-supplied observability callbacks

use super::events::{
    AttemptCompleteEvent, AttemptStartEvent, FailureEvent, HookKind, SuccessEvent, ToolCallEvent,
    ToolResultEvent, ValidationCompleteEvent, ValidationStartEvent,
};
use crate::error::AgentError;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// A callback for one hook kind; `Err` is logged and ignored
pub type Callback<E> = Arc<dyn Fn(&E) -> Result<(), String> + Send + Sync>;

/// Optional callbacks invoked synchronously at execution transitions
///
/// Callbacks are best effort. A callback that returns `Err` or panics is
/// logged as a [`AgentError::CallbackFailed`] warning and execution goes on
/// unchanged.
#[derive(Clone, Default)]
pub struct ExecutionCallbacks {
    attempt_start: Option<Callback<AttemptStartEvent>>,
    attempt_complete: Option<Callback<AttemptCompleteEvent>>,
    validation_start: Option<Callback<ValidationStartEvent>>,
    validation_complete: Option<Callback<ValidationCompleteEvent>>,
    tool_call: Option<Callback<ToolCallEvent>>,
    tool_result: Option<Callback<ToolResultEvent>>,
    success: Option<Callback<SuccessEvent>>,
    failure: Option<Callback<FailureEvent>>,
}

macro_rules! callback_setters {
    ($($setter:ident => $field:ident : $event:ty),* $(,)?) => {
        $(
            pub fn $setter<F>(mut self, callback: F) -> Self
            where
                F: Fn(&$event) -> Result<(), String> + Send + Sync + 'static,
            {
                self.$field = Some(Arc::new(callback));
                self
            }
        )*
    };
}

impl ExecutionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    callback_setters! {
        on_attempt_start => attempt_start: AttemptStartEvent,
        on_attempt_complete => attempt_complete: AttemptCompleteEvent,
        on_validation_start => validation_start: ValidationStartEvent,
        on_validation_complete => validation_complete: ValidationCompleteEvent,
        on_tool_call => tool_call: ToolCallEvent,
        on_tool_result => tool_result: ToolResultEvent,
        on_success => success: SuccessEvent,
        on_failure => failure: FailureEvent,
    }

    /// Whether a callback is registered for `kind`
    pub fn has(&self, kind: HookKind) -> bool {
        match kind {
            HookKind::AttemptStart => self.attempt_start.is_some(),
            HookKind::AttemptComplete => self.attempt_complete.is_some(),
            HookKind::ValidationStart => self.validation_start.is_some(),
            HookKind::ValidationComplete => self.validation_complete.is_some(),
            HookKind::ToolCall => self.tool_call.is_some(),
            HookKind::ToolResult => self.tool_result.is_some(),
            HookKind::Success => self.success.is_some(),
            HookKind::Failure => self.failure.is_some(),
        }
    }

    // Events are built lazily so unobserved transitions cost nothing.

    pub(crate) fn attempt_start(&self, event: impl FnOnce() -> AttemptStartEvent) {
        invoke(HookKind::AttemptStart, self.attempt_start.as_ref(), event);
    }

    pub(crate) fn attempt_complete(&self, event: impl FnOnce() -> AttemptCompleteEvent) {
        invoke(HookKind::AttemptComplete, self.attempt_complete.as_ref(), event);
    }

    pub(crate) fn validation_start(&self, event: impl FnOnce() -> ValidationStartEvent) {
        invoke(HookKind::ValidationStart, self.validation_start.as_ref(), event);
    }

    pub(crate) fn validation_complete(&self, event: impl FnOnce() -> ValidationCompleteEvent) {
        invoke(HookKind::ValidationComplete, self.validation_complete.as_ref(), event);
    }

    pub(crate) fn tool_call(&self, event: impl FnOnce() -> ToolCallEvent) {
        invoke(HookKind::ToolCall, self.tool_call.as_ref(), event);
    }

    pub(crate) fn tool_result(&self, event: impl FnOnce() -> ToolResultEvent) {
        invoke(HookKind::ToolResult, self.tool_result.as_ref(), event);
    }

    pub(crate) fn success(&self, event: impl FnOnce() -> SuccessEvent) {
        invoke(HookKind::Success, self.success.as_ref(), event);
    }

    pub(crate) fn failure(&self, event: impl FnOnce() -> FailureEvent) {
        invoke(HookKind::Failure, self.failure.as_ref(), event);
    }
}

impl fmt::Debug for ExecutionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<&str> = HookKind::all()
            .iter()
            .filter(|kind| self.has(**kind))
            .map(HookKind::as_str)
            .collect();
        f.debug_struct("ExecutionCallbacks")
            .field("registered", &registered)
            .finish()
    }
}

fn invoke<E>(kind: HookKind, callback: Option<&Callback<E>>, event: impl FnOnce() -> E) {
    let Some(callback) = callback else {
        return;
    };
    let event = event();
    let message = match panic::catch_unwind(AssertUnwindSafe(|| callback(&event))) {
        Ok(Ok(())) => return,
        Ok(Err(message)) => message,
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };
    let error = AgentError::CallbackFailed {
        hook: kind,
        message,
    };
    warn!(code = error.code(), hook = %kind, "{}", error);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
