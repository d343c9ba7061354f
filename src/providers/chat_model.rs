use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::base::{AssistantResponse, ChatTransport};
use super::configs::ModelConfig;
use super::types::message::Message;
use super::types::tool::{ToolChoice, ToolDefinition};
use super::utils::{
    messages_to_openai_spec, normalize_tool_choice, openai_response_to_assistant, tool_names,
    tools_to_openai_spec,
};
use crate::errors::ModelResult;

/// Options accepted when binding tools to a model.
#[derive(Debug, Clone)]
pub struct BindOptions {
    pub tool_choice: Option<ToolChoice>,
    /// Enforce the tool schemas exactly. Defaults to `Some(true)`.
    pub strict: Option<bool>,
    pub parallel_tool_calls: Option<bool>,
    /// Extra request fields sent with every call.
    pub extra: Map<String, Value>,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            tool_choice: None,
            strict: Some(true),
            parallel_tool_calls: None,
            extra: Map::new(),
        }
    }
}

impl BindOptions {
    pub fn with_tool_choice(mut self, tool_choice: impl Into<ToolChoice>) -> Self {
        self.tool_choice = Some(tool_choice.into());
        self
    }
}

/// A chat model backed by an injected [`ChatTransport`].
///
/// The model holds no per-call state and can be shared across threads.
#[derive(Clone)]
pub struct ChatModel {
    transport: Arc<dyn ChatTransport>,
    config: ModelConfig,
}

impl ChatModel {
    pub fn new(transport: Arc<dyn ChatTransport>, config: ModelConfig) -> Self {
        Self { transport, config }
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    /// Produce one assistant turn for the conversation.
    pub fn generate(
        &self,
        messages: &[Message],
        stop: Option<&[String]>,
    ) -> ModelResult<AssistantResponse> {
        self.generate_with(messages, stop, &Map::new())
    }

    fn generate_with(
        &self,
        messages: &[Message],
        stop: Option<&[String]>,
        options: &Map<String, Value>,
    ) -> ModelResult<AssistantResponse> {
        let mut payload = options.clone();
        if let Some(temp) = self.config.temperature {
            payload.entry("temperature").or_insert(json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            payload.entry("max_tokens").or_insert(json!(tokens));
        }
        if let Some(sequences) = stop.or(self.config.stop.as_deref()) {
            payload.insert("stop".to_string(), json!(sequences));
        }
        payload.insert(
            "messages".to_string(),
            Value::Array(messages_to_openai_spec(messages)?),
        );

        let response = self.transport.create_completion(payload)?;
        let decoded = openai_response_to_assistant(&response)?;
        debug!(
            model = %self.config.model_name,
            tool_calls = decoded.tool_calls.len(),
            "decoded assistant turn"
        );
        Ok(decoded)
    }

    /// Bind tools and an optional tool choice. No request is made.
    pub fn bind_tools(
        &self,
        tools: &[ToolDefinition],
        options: BindOptions,
    ) -> ModelResult<BoundChatModel> {
        let formatted_tools = tools_to_openai_spec(tools, options.strict)?;
        let names = tool_names(&formatted_tools);

        let mut call_options = options.extra;
        if let Some(parallel) = options.parallel_tool_calls {
            call_options.insert("parallel_tool_calls".to_string(), json!(parallel));
        }
        if let Some(choice) = options.tool_choice.as_ref().filter(|c| !c.is_unset()) {
            call_options.insert(
                "tool_choice".to_string(),
                normalize_tool_choice(choice, &names)?,
            );
        }
        call_options.insert("tools".to_string(), Value::Array(formatted_tools));

        Ok(BoundChatModel {
            model: self.clone(),
            options: call_options,
        })
    }
}

/// A [`ChatModel`] with tools and call options attached.
#[derive(Clone)]
pub struct BoundChatModel {
    model: ChatModel,
    options: Map<String, Value>,
}

impl BoundChatModel {
    pub fn tools(&self) -> &[Value] {
        self.options
            .get("tools")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn tool_choice(&self) -> Option<&Value> {
        self.options.get("tool_choice")
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn invoke(&self, messages: &[Message]) -> ModelResult<AssistantResponse> {
        self.model.generate_with(messages, None, &self.options)
    }

    pub fn invoke_with_stop(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> ModelResult<AssistantResponse> {
        self.model.generate_with(messages, Some(stop), &self.options)
    }
}
