use serde::Deserialize;

pub const POLLINATIONS_HOST: &str = "https://text.pollinations.ai";
pub const CHAT_COMPLETIONS_PATH: &str = "v1/chat/completions";

/// Transport settings for the chat completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PollinationsConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Upper bound on one round-trip, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts for 429 and 5xx responses.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl PollinationsConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn completions_url(&self) -> String {
        format!(
            "{}/{}",
            self.host.trim_end_matches('/'),
            CHAT_COMPLETIONS_PATH
        )
    }
}

impl Default for PollinationsConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Generation parameters applied to every request of a model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default)]
    pub stop: Option<Vec<String>>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            temperature: None,
            max_tokens: None,
            stop: None,
        }
    }
}

pub(crate) fn default_host() -> String {
    POLLINATIONS_HOST.to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    600
}

pub(crate) fn default_max_retries() -> u32 {
    0
}

pub(crate) fn default_model_name() -> String {
    "gpt-4o".to_string()
}
