use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

use super::objectid::create_object_id;
use crate::errors::{ModelError, ModelResult};
use crate::tools::Tool;

/// A single tool invocation requested by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Create a call with a freshly generated id. `arguments` must be a JSON object.
    pub fn new(name: impl Into<String>, arguments: Value) -> ModelResult<Self> {
        Self::with_id(create_object_id("call"), name, arguments)
    }

    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: Value,
    ) -> ModelResult<Self> {
        let id = id.into();
        match arguments {
            Value::Object(arguments) => Ok(Self {
                id,
                name: name.into(),
                arguments,
            }),
            other => Err(ModelError::MalformedArguments {
                id,
                arguments: other.to_string(),
                source: None,
            }),
        }
    }
}

/// A tool definition in the shape offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    #[serde(default)]
    pub strict: bool,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            strict: false,
        }
    }
}

/// The representations a tool can be bound from.
#[derive(Debug, Clone)]
pub enum ToolDefinition {
    /// A JSON tool record, either `{type: "function", function: {...}}` or `{name, ...}`.
    RawSchema(Value),
    /// A callable tool whose schema is derived from its declared parameters.
    Callable(Arc<Tool>),
    /// An already structured descriptor.
    Descriptor(ToolSpec),
}

impl ToolDefinition {
    pub fn to_spec(&self) -> ModelResult<ToolSpec> {
        match self {
            ToolDefinition::RawSchema(schema) => raw_schema_to_spec(schema),
            ToolDefinition::Callable(tool) => Ok(callable_to_spec(tool)),
            ToolDefinition::Descriptor(spec) => Ok(spec.clone()),
        }
    }
}

impl From<Tool> for ToolDefinition {
    fn from(tool: Tool) -> Self {
        ToolDefinition::Callable(Arc::new(tool))
    }
}

impl From<ToolSpec> for ToolDefinition {
    fn from(spec: ToolSpec) -> Self {
        ToolDefinition::Descriptor(spec)
    }
}

fn raw_schema_to_spec(schema: &Value) -> ModelResult<ToolSpec> {
    let function = match schema.get("function") {
        Some(function) if schema.get("type").and_then(Value::as_str) == Some("function") => {
            function
        }
        _ => schema,
    };
    let name = function
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ModelError::InvalidToolDefinition(schema.to_string()))?;

    Ok(ToolSpec {
        name: name.to_string(),
        description: function
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        parameters: function
            .get("parameters")
            .cloned()
            .unwrap_or_else(|| json!({"type": "object", "properties": {}})),
        strict: function
            .get("strict")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn callable_to_spec(tool: &Tool) -> ToolSpec {
    let mut required: Vec<&String> = tool.parameters.keys().collect();
    required.sort();

    ToolSpec::new(
        &tool.name,
        &tool.description,
        json!({
            "type": "object",
            "properties": tool.parameters,
            "required": required,
        }),
    )
}

/// Provider built-in tools that can be selected by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BuiltinTool {
    FileSearch,
    WebSearchPreview,
    ComputerUsePreview,
}

/// Directive controlling whether and which tools the model may call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolChoice {
    Auto,
    None,
    Required,
    /// Alias of [`ToolChoice::Required`].
    Any,
    /// A bound tool name. Built-in kinds given by name are resolved too.
    Named(String),
    Builtin(BuiltinTool),
    /// `true` requires a tool call, `false` disables tools.
    Enabled(bool),
    /// A caller supplied value. Objects pass through unchanged.
    Raw(Value),
}

impl ToolChoice {
    /// Whether the choice carries no policy and should be left out of the request.
    pub fn is_unset(&self) -> bool {
        match self {
            ToolChoice::Named(name) => name.is_empty(),
            ToolChoice::Raw(Value::Null) => true,
            ToolChoice::Raw(Value::Object(map)) => map.is_empty(),
            _ => false,
        }
    }
}

/// Strings stay [`ToolChoice::Named`] so a bound tool called `auto` or `any`
/// can still be selected; keywords are resolved against the bound tools.
impl From<&str> for ToolChoice {
    fn from(value: &str) -> Self {
        ToolChoice::Named(value.to_string())
    }
}

impl From<String> for ToolChoice {
    fn from(value: String) -> Self {
        ToolChoice::from(value.as_str())
    }
}

impl From<bool> for ToolChoice {
    fn from(value: bool) -> Self {
        ToolChoice::Enabled(value)
    }
}

impl From<BuiltinTool> for ToolChoice {
    fn from(value: BuiltinTool) -> Self {
        ToolChoice::Builtin(value)
    }
}

impl From<Value> for ToolChoice {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => ToolChoice::from(s),
            Value::Bool(b) => ToolChoice::Enabled(b),
            other => ToolChoice::Raw(other),
        }
    }
}

impl BuiltinTool {
    pub fn parse(name: &str) -> Option<Self> {
        BuiltinTool::from_str(name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_tool_call_requires_object_arguments() {
        let call = ToolCall::with_id("call_1", "lookup_policy", json!({"query": "refund"}));
        assert!(call.is_ok());

        let result = ToolCall::with_id("call_2", "lookup_policy", json!("refund"));
        assert!(matches!(
            result,
            Err(ModelError::MalformedArguments { ref id, .. }) if id == "call_2"
        ));
    }

    #[test]
    fn test_raw_schema_openai_shape() -> ModelResult<()> {
        let raw = json!({
            "type": "function",
            "function": {
                "name": "search",
                "description": "Search the catalog",
                "parameters": {"type": "object", "properties": {"q": {"type": "string"}}}
            }
        });
        let spec = ToolDefinition::RawSchema(raw).to_spec()?;
        assert_eq!(spec.name, "search");
        assert_eq!(spec.description, "Search the catalog");
        assert_eq!(spec.parameters["properties"]["q"]["type"], "string");
        Ok(())
    }

    #[test]
    fn test_raw_schema_bare_shape_and_missing_name() -> ModelResult<()> {
        let spec = ToolDefinition::RawSchema(json!({"name": "cancel"})).to_spec()?;
        assert_eq!(spec.name, "cancel");
        assert_eq!(spec.parameters["type"], "object");

        let result = ToolDefinition::RawSchema(json!({"description": "nameless"})).to_spec();
        assert!(matches!(result, Err(ModelError::InvalidToolDefinition(_))));
        Ok(())
    }

    #[test]
    fn test_callable_to_spec() -> ModelResult<()> {
        let parameters = HashMap::from([
            ("query".to_string(), json!({"type": "string"})),
            ("limit".to_string(), json!({"type": "integer"})),
        ]);
        let tool = Tool::new(
            "search".to_string(),
            "Search things".to_string(),
            parameters,
            |_| Ok(json!("ok")),
        );

        let spec = ToolDefinition::from(tool).to_spec()?;
        assert_eq!(spec.name, "search");
        assert_eq!(spec.parameters["type"], "object");
        assert_eq!(spec.parameters["required"], json!(["limit", "query"]));
        assert_eq!(spec.parameters["properties"]["query"]["type"], "string");
        Ok(())
    }

    #[test]
    fn test_tool_choice_from_values() {
        assert_eq!(ToolChoice::from("auto"), ToolChoice::Named("auto".to_string()));
        assert_eq!(
            ToolChoice::from("search"),
            ToolChoice::Named("search".to_string())
        );
        assert_eq!(ToolChoice::from(json!(true)), ToolChoice::Enabled(true));
        assert_eq!(
            ToolChoice::from(json!({"type": "function"})),
            ToolChoice::Raw(json!({"type": "function"}))
        );
    }

    #[test]
    fn test_builtin_tool_names() {
        assert_eq!(BuiltinTool::parse("file_search"), Some(BuiltinTool::FileSearch));
        assert_eq!(
            BuiltinTool::parse("web_search_preview"),
            Some(BuiltinTool::WebSearchPreview)
        );
        assert_eq!(BuiltinTool::ComputerUsePreview.to_string(), "computer_use_preview");
        assert_eq!(BuiltinTool::parse("web_search"), None);
    }
}
