//! Observability hooks
//!
//! Best-effort callbacks fired at execution transitions. They observe only;
//! nothing a callback does can change an execution's outcome.

mod callbacks;
mod events;

pub use callbacks::{Callback, ExecutionCallbacks};
pub use events::{
    AttemptCompleteEvent, AttemptStartEvent, FailureEvent, HookKind, SuccessEvent, ToolCallEvent,
    ToolResultEvent, ValidationCompleteEvent, ValidationStartEvent,
};
