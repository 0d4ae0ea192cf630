//! Agent settings and the limits applied when building a definition

pub mod defaults;
mod settings;

pub use defaults::{MAX_TEMPERATURE, MIN_MAX_TOKENS, MIN_TEMPERATURE};
pub use settings::{
    AgentSettings, ModelConfig, ModelPricing, ObservabilityConfig, ValidationSettings,
};

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load or write settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} settings: {message}")]
    Parse { format: &'static str, message: String },

    #[error("Failed to serialize settings: {0}")]
    Serialize(String),
}
