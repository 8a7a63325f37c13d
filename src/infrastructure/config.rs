//! Configuration loading and validation.
//!
//! Layered: built-in defaults, then an optional `copyforge.yaml`, then
//! `COPYFORGE_*` environment variables. Nested fields use `__` in the
//! environment, e.g. `COPYFORGE_BUDGET__MAX_CALLS_PER_RUN=10`.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::PipelineConfig;

pub const DEFAULT_CONFIG_FILE: &str = "copyforge.yaml";
const ENV_PREFIX: &str = "COPYFORGE_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load config from the default file location (if present) and environment.
pub fn load() -> Result<PipelineConfig, ConfigError> {
    load_from(DEFAULT_CONFIG_FILE)
}

/// Load config with an explicit file path. A missing file is fine; the
/// defaults and environment still apply.
pub fn load_from(path: impl AsRef<Path>) -> Result<PipelineConfig, ConfigError> {
    let config: PipelineConfig = Figment::new()
        .merge(Serialized::defaults(PipelineConfig::default()))
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(Box::new)?;
    validate(&config)?;
    Ok(config)
}

/// Reject configurations that would make the pipeline misbehave.
pub fn validate(config: &PipelineConfig) -> Result<(), ConfigError> {
    let invalid = |msg: String| Err(ConfigError::Invalid(msg));

    if config.dedupe.similarity_threshold > 100 {
        return invalid(format!(
            "dedupe.similarity_threshold must be 0-100, got {}",
            config.dedupe.similarity_threshold
        ));
    }
    if !(1..=5).contains(&config.dedupe.min_distinct_angles) {
        return invalid(format!(
            "dedupe.min_distinct_angles must be 1-5, got {}",
            config.dedupe.min_distinct_angles
        ));
    }
    if config.generation.max_retries_validation == 0 {
        return invalid("generation.max_retries_validation must be at least 1".to_string());
    }
    if config.generation.max_headline_chars == 0 || config.generation.max_description_chars == 0 {
        return invalid("character limits must be greater than zero".to_string());
    }
    if config.generation.num_headlines == 0 || config.generation.num_descriptions == 0 {
        return invalid("candidate counts must be greater than zero".to_string());
    }
    if config.retry.backoff_base_ms == 0 {
        return invalid("retry.backoff_base_ms must be greater than zero".to_string());
    }
    if config.retry.backoff_max_ms < config.retry.backoff_base_ms {
        return invalid(format!(
            "retry.backoff_max_ms ({}) must be >= retry.backoff_base_ms ({})",
            config.retry.backoff_max_ms, config.retry.backoff_base_ms
        ));
    }
    Ok(())
}
