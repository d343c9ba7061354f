use anyhow::{bail, Context, Result};
use chrono::Local;
use serde::Deserialize;
use tracing::{info, warn};

use crate::prompt::support_system_prompt;
use crate::providers::base::AssistantResponse;
use crate::providers::chat_model::{BindOptions, BoundChatModel, ChatModel};
use crate::providers::types::message::Message;
use crate::tools::Toolbox;

/// Nudge appended when the model answers with nothing at all.
pub const EMPTY_OUTPUT_NUDGE: &str = "Respond with a real output.";

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Extra attempts when the model returns neither text nor tool calls.
    #[serde(default = "default_max_empty_retries")]
    pub max_empty_retries: usize,
    /// Model calls allowed for a single user turn.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_empty_retries: default_max_empty_retries(),
            max_turns: default_max_turns(),
        }
    }
}

pub(crate) fn default_max_empty_retries() -> usize {
    3
}

pub(crate) fn default_max_turns() -> usize {
    10
}

/// Customer support assistant: alternates model turns and tool execution
/// until the model answers in plain text.
pub struct SupportAgent {
    model: BoundChatModel,
    toolbox: Toolbox,
    config: AgentConfig,
}

impl SupportAgent {
    pub fn new(model: &ChatModel, toolbox: Toolbox, config: AgentConfig) -> Result<Self> {
        let model = model
            .bind_tools(&toolbox.definitions(), BindOptions::default())
            .context("Failed to bind tools")?;
        Ok(Self {
            model,
            toolbox,
            config,
        })
    }

    /// Continue the conversation after the latest user turn.
    ///
    /// New assistant and tool turns are appended to `history` and also
    /// returned, oldest first.
    pub fn reply(&self, history: &mut Vec<Message>) -> Result<Vec<Message>> {
        let start = history.len();

        for turn in 0..self.config.max_turns {
            let response = self.assistant_turn(history)?;
            let message = response.into_message();
            let tool_calls = message.tool_calls.clone();
            history.push(message);

            if tool_calls.is_empty() {
                info!(turn, "assistant answered");
                return Ok(history[start..].to_vec());
            }

            info!(turn, calls = tool_calls.len(), "assistant requested tools");
            history.extend(self.toolbox.dispatch(&tool_calls));
        }

        bail!(
            "Assistant did not produce an answer within {} turns",
            self.config.max_turns
        )
    }

    fn assistant_turn(&self, history: &[Message]) -> Result<AssistantResponse> {
        let system = Message::system(
            support_system_prompt(&Local::now()).context("Failed to render system prompt")?,
        );
        let mut conversation = Vec::with_capacity(history.len() + 1);
        conversation.push(system);
        conversation.extend_from_slice(history);

        for attempt in 0..=self.config.max_empty_retries {
            let response = self.model.invoke(&conversation)?;
            if !response.is_empty() {
                return Ok(response);
            }
            warn!(attempt, "assistant returned an empty response");
            conversation.push(Message::user(EMPTY_OUTPUT_NUDGE));
        }

        bail!(
            "Assistant returned empty output {} times",
            self.config.max_empty_retries + 1
        )
    }
}
