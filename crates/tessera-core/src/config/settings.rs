//! Agent settings loadable from TOML or JSON

use super::ConfigError;
use super::defaults;
use crate::llm::TokenUsage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Model parameters for every call an agent makes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "defaults::provider")]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "defaults::temperature")]
    pub temperature: f32,
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: u32,
    /// Used for cost metrics; cost stays unknown without it
    #[serde(default)]
    pub pricing: Option<ModelPricing>,
}

impl ModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_pricing(mut self, pricing: ModelPricing) -> Self {
        self.pricing = Some(pricing);
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: defaults::provider(),
            model: String::new(),
            temperature: defaults::DEFAULT_TEMPERATURE,
            max_tokens: defaults::DEFAULT_MAX_TOKENS,
            pricing: None,
        }
    }
}

/// USD per thousand tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

impl ModelPricing {
    pub fn new(input_cost_per_1k: f64, output_cost_per_1k: f64) -> Self {
        Self {
            input_cost_per_1k,
            output_cost_per_1k,
        }
    }

    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        (usage.input_tokens as f64 / 1000.0) * self.input_cost_per_1k
            + (usage.output_tokens as f64 / 1000.0) * self.output_cost_per_1k
    }
}

/// Retry budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSettings {
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "defaults::max_iterations")]
    pub max_iterations: u32,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_MAX_ATTEMPTS,
            max_iterations: defaults::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Which execution metrics to collect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub track_cost: bool,
    pub track_latency: bool,
    pub track_attempts: bool,
    pub track_tokens: bool,
}

impl ObservabilityConfig {
    pub fn all() -> Self {
        Self {
            track_cost: true,
            track_latency: true,
            track_attempts: true,
            track_tokens: true,
        }
    }
}

/// Serializable agent settings
///
/// ```toml
/// [model]
/// model = "claude-sonnet-4"
/// temperature = 0.2
///
/// [validation]
/// max_attempts = 5
///
/// [observability]
/// track_tokens = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub model: ModelConfig,
    pub validation: ValidationSettings,
    pub observability: ObservabilityConfig,
}

impl AgentSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            format: "TOML",
            message: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            format: "JSON",
            message: e.to_string(),
        })
    }

    /// Load from a `.json` file, or TOML for any other extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading agent settings from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = AgentSettings::default();
        assert_eq!(settings.model.temperature, 0.7);
        assert_eq!(settings.model.max_tokens, 4096);
        assert_eq!(settings.validation.max_attempts, 3);
        assert_eq!(settings.validation.max_iterations, 10);
        assert_eq!(settings.observability, ObservabilityConfig::default());
        assert!(!settings.observability.track_cost);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings = AgentSettings::from_toml_str(
            r#"
            [model]
            model = "claude-sonnet-4"

            [validation]
            max_attempts = 5

            [observability]
            track_tokens = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.model, "claude-sonnet-4");
        assert_eq!(settings.model.provider, "anthropic");
        assert_eq!(settings.model.temperature, 0.7);
        assert_eq!(settings.validation.max_attempts, 5);
        assert_eq!(settings.validation.max_iterations, 10);
        assert!(settings.observability.track_tokens);
        assert!(!settings.observability.track_latency);
    }

    #[test]
    fn test_parse_error() {
        let err = AgentSettings::from_toml_str("[model\nmodel = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));
    }

    #[test]
    fn test_from_files() {
        let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            toml_file,
            "[model]\nmodel = \"m\"\n[model.pricing]\n\
             input_cost_per_1k = 3.0\noutput_cost_per_1k = 15.0"
        )
        .unwrap();
        let settings = AgentSettings::from_file(toml_file.path()).unwrap();
        let pricing = settings.model.pricing.unwrap();
        assert_eq!(pricing.cost(&TokenUsage::new(1000, 2000)), 33.0);

        let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json_file, r#"{{"validation": {{"max_iterations": 2}}}}"#).unwrap();
        let settings = AgentSettings::from_file(json_file.path()).unwrap();
        assert_eq!(settings.validation.max_iterations, 2);
        assert_eq!(settings.validation.max_attempts, 3);
    }

    #[test]
    fn test_missing_file() {
        let err = AgentSettings::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = AgentSettings {
            model: ModelConfig::new("m").with_temperature(0.25),
            ..AgentSettings::default()
        };
        let text = settings.to_toml_string().unwrap();
        assert_eq!(AgentSettings::from_toml_str(&text).unwrap(), settings);
    }
}
