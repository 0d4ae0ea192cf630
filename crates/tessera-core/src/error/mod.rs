//! Error types for Tessera
//!
//! Every component reports through [`AgentError`]. Each variant is one error
//! code carrying only the context relevant to it; [`ErrorCategory`] and
//! [`Severity`] are derived from the variant by exhaustive matching:
//! - `validation`: an output failed a pipeline layer, or a definition was
//!   misconfigured at construction time
//! - `execution`: prompt generation failed or a budget was exceeded
//! - `model`: the provider failed
//! - `observability`: a hook failed (logged, never propagated)

mod conversions;
mod taxonomy;
mod types;

pub use taxonomy::{ErrorCategory, Severity};
pub use types::{AgentError, AgentResult, PromptKind};
