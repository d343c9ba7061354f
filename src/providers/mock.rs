use serde_json::{Map, Value};
use std::sync::Mutex;

use super::base::ChatTransport;
use crate::errors::{ModelError, ModelResult};

/// A mock transport that records payloads and replays pre-configured responses
pub struct MockTransport {
    responses: Mutex<Vec<Value>>,
    payloads: Mutex<Vec<Value>>,
}

impl MockTransport {
    /// Create a new mock transport with a sequence of response bodies
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: Mutex::new(responses),
            payloads: Mutex::new(Vec::new()),
        }
    }

    /// Every payload received so far, oldest first
    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }
}

impl ChatTransport for MockTransport {
    fn create_completion(&self, payload: Map<String, Value>) -> ModelResult<Value> {
        self.payloads.lock().unwrap().push(Value::Object(payload));
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(ModelError::Transport {
                status: 500,
                body: "no more mock responses".to_string(),
            })
        } else {
            Ok(responses.remove(0))
        }
    }
}
