use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::message::Message;
use super::types::tool::ToolCall;
use crate::errors::ModelResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// The decoded result of one model call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<Usage>,
}

impl AssistantResponse {
    /// True when the model produced neither text nor tool calls.
    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty() && self.content.trim().is_empty()
    }

    pub fn into_message(self) -> Message {
        if self.tool_calls.is_empty() {
            Message::assistant(self.content)
        } else {
            Message::assistant_with_tool_calls(self.content, self.tool_calls)
        }
    }
}

/// Outbound transport for chat completion requests.
///
/// Implementations perform exactly one logical request per call and return
/// the decoded JSON body of a successful response.
pub trait ChatTransport: Send + Sync {
    fn create_completion(&self, payload: Map<String, Value>) -> ModelResult<Value>;
}
