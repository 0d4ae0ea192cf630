//! Reusable helper tools for Tessera agents
//!
//! Each tool is written against a capability trait rather than a concrete
//! run state, so several tools can share one agent's run state.

pub mod sampler;

pub use sampler::{
    HasSamplerState, SAMPLER_TOOL_NAME, SamplerReducer, SamplerState, sampler_tool,
    sampler_tool_with,
};
