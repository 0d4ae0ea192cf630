//! Default values and limits for agent settings

pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const MIN_MAX_TOKENS: u32 = 1;

pub(super) fn provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

pub(super) fn temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

pub(super) fn max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

pub(super) fn max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

pub(super) fn max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}
