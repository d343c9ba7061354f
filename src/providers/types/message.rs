use serde::{Deserialize, Serialize};
use std::fmt;

use super::objectid::create_object_id;
use super::tool::ToolCall;
use crate::errors::{ModelError, ModelResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
    /// Legacy function-result turns. Accepted in history but the chat
    /// completions wire format has no mapping for them.
    Function,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
            Role::Function => "function",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub id: String,
    pub created: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Create a plain turn. Tool results need a call id, use [`Message::tool`].
    pub fn new(role: Role, content: impl Into<String>) -> ModelResult<Self> {
        let msg = Self::build(role, content.into(), None, Vec::new());
        msg.validate()?;
        Ok(msg)
    }

    fn build(
        role: Role,
        content: String,
        tool_call_id: Option<String>,
        tool_calls: Vec<ToolCall>,
    ) -> Self {
        Self {
            role,
            id: create_object_id("msg"),
            created: chrono::Utc::now().timestamp(),
            content,
            tool_call_id,
            tool_calls,
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        match self.role {
            Role::Tool => {
                if self.tool_call_id.is_none() {
                    return Err(ModelError::InvalidMessage(
                        "Tool message must reference a tool_call_id".to_string(),
                    ));
                }
            }
            _ if self.tool_call_id.is_some() => {
                return Err(ModelError::InvalidMessage(format!(
                    "{} message does not support tool_call_id",
                    self.role
                )));
            }
            _ => {}
        }
        if !self.tool_calls.is_empty() && self.role != Role::Assistant {
            return Err(ModelError::InvalidMessage(format!(
                "{} message does not support tool_calls",
                self.role
            )));
        }
        Ok(())
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::build(Role::User, text.into(), None, Vec::new())
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::build(Role::Assistant, text.into(), None, Vec::new())
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::build(Role::System, text.into(), None, Vec::new())
    }

    pub fn tool(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self::build(Role::Tool, output.into(), Some(tool_call_id.into()), Vec::new())
    }

    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::build(Role::Assistant, text.into(), None, tool_calls)
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Human readable rendering used by the CLI.
    pub fn summary(&self) -> String {
        let title = match self.role {
            Role::User => " Human Message ",
            Role::Assistant => " Ai Message ",
            Role::System => " System Message ",
            Role::Tool => " Tool Message ",
            Role::Function => " Function Message ",
        };
        let mut out = format!("{:=^64}\n", title);
        if !self.content.is_empty() {
            out.push('\n');
            out.push_str(&self.content);
            out.push('\n');
        }
        if !self.tool_calls.is_empty() {
            out.push_str("Tool Calls:\n");
            for call in &self.tool_calls {
                out.push_str(&format!("  {} ({})\n", call.name, call.id));
                out.push_str(&format!(
                    "    Args: {}\n",
                    serde_json::to_string(&call.arguments).unwrap_or_default()
                ));
            }
        }
        out
    }
}
