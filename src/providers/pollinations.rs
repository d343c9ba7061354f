use reqwest::blocking::Client; // blocking API, every completion is one synchronous round-trip
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::base::ChatTransport;
use super::configs::PollinationsConfig;
use crate::errors::{ModelError, ModelResult};

/// The model identifier the endpoint expects, regardless of the caller's model name.
pub const POLLINATIONS_MODEL: &str = "openai";
const RETRY_BACKOFF: Duration = Duration::from_millis(200);

pub struct PollinationsClient {
    client: Client,
    config: PollinationsConfig,
}

impl PollinationsClient {
    pub fn new(config: PollinationsConfig) -> ModelResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn post(&self, url: &str, payload: &Map<String, Value>) -> ModelResult<Value> {
        let response = self.client.post(url).json(payload).send()?;

        match response.status() {
            StatusCode::OK => Ok(response.json()?),
            status => {
                let body = response.text().unwrap_or_default();
                Err(ModelError::Transport {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

/// Overwrite the fixed request fields the endpoint is always called with.
pub fn with_fixed_params(mut payload: Map<String, Value>) -> Map<String, Value> {
    payload.insert("private".to_string(), json!(true));
    payload.insert("model".to_string(), json!(POLLINATIONS_MODEL));
    payload.insert("web_search".to_string(), json!(false));
    payload.insert("seed".to_string(), json!(1));
    payload
}

fn is_retryable(status: u16) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS.as_u16() || status >= 500
}

impl ChatTransport for PollinationsClient {
    fn create_completion(&self, payload: Map<String, Value>) -> ModelResult<Value> {
        let payload = with_fixed_params(payload);
        let url = self.config.completions_url();
        debug!(url = %url, fields = payload.len(), "posting chat completion");

        let mut attempt = 0;
        loop {
            match self.post(&url, &payload) {
                Err(ModelError::Transport { status, body })
                    if is_retryable(status) && attempt < self.config.max_retries =>
                {
                    attempt += 1;
                    warn!(status, attempt, "retrying chat completion: {}", body);
                    thread::sleep(RETRY_BACKOFF * attempt);
                }
                result => return result,
            }
        }
    }
}
