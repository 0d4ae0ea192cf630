//! Tessera
//!
//! Schema-validated structured output from language-model agents with
//! bounded corrective retries. This crate bundles the engine from
//! `tessera-core` with the helper tools from `tessera-tools`.

pub use tessera_core::*;
pub use tessera_tools as tools_ext;

pub use tessera_tools::{HasSamplerState, SamplerState, sampler_tool};
