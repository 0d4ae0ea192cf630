//! Tools exposed to the model
//!
//! Exactly one [`OutputTool`] carries the final output. Any number of
//! [`HelperTool`]s let the model update execution state through pure
//! [`ToolReducer`]s along the way.

mod reducer;
mod types;

pub use reducer::{HelperTool, ToolReducer, ToolTransition};
pub use types::{OutputTool, ToolCall, ToolDescriptor};
