use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;

use super::base::{AssistantResponse, Usage};
use super::types::message::{Message, Role};
use super::types::tool::{BuiltinTool, ToolCall, ToolChoice, ToolDefinition};
use crate::errors::{ModelError, ModelResult};

/// Convert the conversation history to chat completions wire messages.
///
/// Assistant turns that carry tool calls are sent with empty content.
pub fn messages_to_openai_spec(messages: &[Message]) -> ModelResult<Vec<Value>> {
    let mut messages_spec = Vec::with_capacity(messages.len());

    for message in messages {
        if message.role == Role::Tool {
            messages_spec.push(json!({
                "role": "tool",
                "content": message.content,
                "tool_call_id": message.tool_call_id,
            }));
        } else if message.role == Role::Assistant && message.has_tool_calls() {
            let tool_calls: Vec<Value> = message
                .tool_calls
                .iter()
                .map(|tool_call| {
                    json!({
                        "id": tool_call.id,
                        "type": "function",
                        "function": {
                            "name": tool_call.name,
                            "arguments": Value::Object(tool_call.arguments.clone()).to_string(),
                        }
                    })
                })
                .collect();
            messages_spec.push(json!({
                "role": "assistant",
                "content": "",
                "tool_calls": tool_calls,
            }));
        } else {
            messages_spec.push(json!({
                "role": wire_role(&message.role)?,
                "content": message.content,
            }));
        }
    }

    Ok(messages_spec)
}

fn wire_role(role: &Role) -> ModelResult<&'static str> {
    match role {
        Role::User => Ok("user"),
        Role::Assistant => Ok("assistant"),
        Role::System => Ok("system"),
        other => Err(ModelError::UnknownRole(other.to_string())),
    }
}

/// Convert tool definitions to chat completions tool records.
///
/// `strict` overrides the per-definition flag when set.
pub fn tools_to_openai_spec(tools: &[ToolDefinition], strict: Option<bool>) -> ModelResult<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::with_capacity(tools.len());

    for tool in tools {
        let spec = tool.to_spec()?;
        if !is_valid_function_name(&spec.name) {
            return Err(ModelError::InvalidToolName(spec.name));
        }
        if !tool_names.insert(spec.name.clone()) {
            return Err(ModelError::DuplicateTool(spec.name));
        }

        let strict = strict.unwrap_or(spec.strict);
        let mut parameters = spec.parameters;
        if strict {
            if let Some(object) = parameters.as_object_mut() {
                object
                    .entry("additionalProperties")
                    .or_insert(Value::Bool(false));
            }
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": spec.name,
                "description": spec.description,
                "parameters": parameters,
                "strict": strict,
            }
        }));
    }

    Ok(result)
}

/// Collect the names of formatted tool records.
pub fn tool_names(tools: &[Value]) -> HashSet<String> {
    tools
        .iter()
        .filter_map(|tool| {
            tool.get("function")
                .and_then(|function| function.get("name"))
                .or_else(|| tool.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}

/// Normalize a tool choice into its wire value.
pub fn normalize_tool_choice(
    choice: &ToolChoice,
    tool_names: &HashSet<String>,
) -> ModelResult<Value> {
    match choice {
        ToolChoice::Auto => Ok(json!("auto")),
        ToolChoice::None | ToolChoice::Enabled(false) => Ok(json!("none")),
        ToolChoice::Required | ToolChoice::Any | ToolChoice::Enabled(true) => Ok(json!("required")),
        ToolChoice::Builtin(builtin) => Ok(json!({"type": builtin.to_string()})),
        // bound tool names win over the keywords below
        ToolChoice::Named(name) => {
            if tool_names.contains(name) {
                Ok(json!({"type": "function", "function": {"name": name}}))
            } else if let Some(builtin) = BuiltinTool::parse(name) {
                Ok(json!({"type": builtin.to_string()}))
            } else {
                match name.as_str() {
                    "any" | "required" => Ok(json!("required")),
                    "auto" | "none" => Ok(json!(name)),
                    _ => Err(ModelError::InvalidToolChoice(name.clone())),
                }
            }
        }
        ToolChoice::Raw(value) => match value {
            Value::Object(_) => Ok(value.clone()),
            Value::String(_) | Value::Bool(_) => {
                normalize_tool_choice(&ToolChoice::from(value.clone()), tool_names)
            }
            other => Err(ModelError::InvalidToolChoice(other.to_string())),
        },
    }
}

/// Decode a chat completions response into an assistant turn.
pub fn openai_response_to_assistant(response: &Value) -> ModelResult<AssistantResponse> {
    let choice = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .ok_or_else(|| ModelError::MalformedResponse("missing choices[0]".to_string()))?;
    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .ok_or_else(|| ModelError::MalformedResponse("missing finish_reason".to_string()))?;
    let message = &choice["message"];

    match finish_reason {
        "stop" => Ok(AssistantResponse {
            content: message["content"].as_str().unwrap_or_default().to_string(),
            tool_calls: Vec::new(),
            usage: get_usage(response),
        }),
        "tool_calls" => {
            let tool_calls = message
                .get("tool_calls")
                .and_then(Value::as_array)
                .ok_or_else(|| ModelError::MalformedResponse("missing message.tool_calls".to_string()))?
                .iter()
                .map(decode_tool_call)
                .collect::<ModelResult<Vec<_>>>()?;
            Ok(AssistantResponse {
                content: String::new(),
                tool_calls,
                usage: get_usage(response),
            })
        }
        other => Err(ModelError::UnsupportedFinishReason(other.to_string())),
    }
}

fn decode_tool_call(tool_call: &Value) -> ModelResult<ToolCall> {
    let id = tool_call["id"]
        .as_str()
        .ok_or_else(|| ModelError::MalformedResponse(format!("tool call without id: {}", tool_call)))?
        .to_string();
    let name = tool_call["function"]["name"].as_str().ok_or_else(|| {
        ModelError::MalformedResponse(format!("tool call {} without function name", id))
    })?;
    let raw_arguments = &tool_call["function"]["arguments"];
    let arguments = raw_arguments.as_str().ok_or_else(|| ModelError::MalformedArguments {
        id: id.clone(),
        arguments: raw_arguments.to_string(),
        source: None,
    })?;

    let parsed = serde_json::from_str::<Value>(arguments).map_err(|e| {
        ModelError::MalformedArguments {
            id: id.clone(),
            arguments: arguments.to_string(),
            source: Some(e),
        }
    })?;
    ToolCall::with_id(id, name, parsed)
}

/// Token counts from the response, if the endpoint reported any.
pub fn get_usage(data: &Value) -> Option<Usage> {
    let usage = data.get("usage")?;

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Some(Usage::new(input_tokens, output_tokens, total_tokens))
}

fn is_valid_function_name(name: &str) -> bool {
    Regex::new(r"^[a-zA-Z0-9_-]+$")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}
