use config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

use crate::agent::{default_max_empty_retries, default_max_turns, AgentConfig};
use crate::providers::configs::{
    default_host, default_max_retries, default_model_name, default_timeout_secs, ModelConfig,
    PollinationsConfig,
};

pub const ENV_PREFIX: &str = "HELPDESK";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {env_var}: {message}")]
    InvalidValue { env_var: String, message: String },
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Convert a dotted settings key to the environment variable that sets it,
/// e.g. `provider.max_retries` becomes `HELPDESK_PROVIDER__MAX_RETRIES`.
pub fn to_env_var(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.replace('.', "__").to_uppercase())
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider: PollinationsConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Provider defaults
            .set_default("provider.host", default_host())?
            .set_default("provider.timeout_secs", default_timeout_secs())?
            .set_default("provider.max_retries", default_max_retries() as u64)?
            // Model defaults
            .set_default("model.model_name", default_model_name())?
            // Agent defaults
            .set_default("agent.max_empty_retries", default_max_empty_retries() as u64)?
            .set_default("agent.max_turns", default_max_turns() as u64)?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("model.stop")
                    .try_parsing(true),
            )
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);
                match &err {
                    config::ConfigError::Type {
                        key: Some(key), ..
                    } => Err(ConfigError::InvalidValue {
                        env_var: to_env_var(key),
                        message: err.to_string(),
                    }),
                    _ => Err(ConfigError::Other(err)),
                }
            }
        }
    }
}
