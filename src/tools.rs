use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{info, warn};

use crate::providers::types::message::Message;
use crate::providers::types::tool::{ToolCall, ToolDefinition};

/// A tool that can be used by a model.
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// A json schema for each parameter, keyed by parameter name
    pub parameters: HashMap<String, Value>,
    /// The function that powers the tool
    pub function: Box<dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync>,
}

impl Tool {
    pub fn new(
        name: String,
        description: String,
        parameters: HashMap<String, Value>,
        function: impl Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Tool {
            name,
            description,
            parameters,
            function: Box::new(function),
        }
    }

    pub fn call(&self, arguments: &Value) -> anyhow::Result<Value> {
        (self.function)(arguments)
    }
}

impl Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("function", &"<function>")
            .finish()
    }
}

/// The set of tools an agent can execute.
#[derive(Debug, Clone, Default)]
pub struct Toolbox {
    tools: Vec<Arc<Tool>>,
}

impl Toolbox {
    pub fn new(tools: Vec<Tool>) -> Self {
        Self {
            tools: tools.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .cloned()
            .map(ToolDefinition::Callable)
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Tool>> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    fn execute(&self, call: &ToolCall) -> anyhow::Result<String> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| anyhow!("Tool not found: {}", call.name))?;
        let output = tool
            .call(&Value::Object(call.arguments.clone()))
            .with_context(|| format!("Tool {} failed", call.name))?;
        Ok(match output {
            Value::String(text) => text,
            other => other.to_string(),
        })
    }

    /// Run every call and return one tool turn per call, in order.
    ///
    /// If any call fails, every call gets an error turn instead so the model
    /// can correct itself on the next turn.
    pub fn dispatch(&self, calls: &[ToolCall]) -> Vec<Message> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            info!(tool = %call.name, id = %call.id, "executing tool call");
            match self.execute(call) {
                Ok(output) => results.push(Message::tool(&call.id, output)),
                Err(error) => {
                    warn!(tool = %call.name, "tool call failed: {:#}", error);
                    return calls
                        .iter()
                        .map(|call| {
                            Message::tool(
                                &call.id,
                                format!("Error: {:?}\n please fix your mistakes.", error),
                            )
                        })
                        .collect();
                }
            }
        }
        results
    }
}

pub const ORDER_CANCELLATION_POLICY: &str = r#"
**Order Cancellation Policy**

Thank you for choosing our products and services. Please note that all sales are final, and once an order has been placed, it cannot be canceled under any circumstances.

This no-cancellation policy ensures that we are able to prepare, process, and deliver your order as quickly and efficiently as possible. Due to the nature of our operations and/or customized offerings, we are unable to accommodate cancellation requests. We kindly ask that you review your order carefully before completing your purchase to ensure all details are correct.

If you have any questions or concerns about your order, please contact our customer service team. We are committed to assisting you to the best of our ability within the scope of our policy.

Thank you for your understanding and cooperation.
"#;

/// Consult the company policies to check whether certain options are permitted.
pub fn lookup_policy() -> Tool {
    Tool::new(
        "lookup_policy".to_string(),
        "Consult the company policies to check whether certain options are permitted."
            .to_string(),
        HashMap::from([(
            "query".to_string(),
            json!({
                "type": "string",
                "description": "What to look up in the company policies"
            }),
        )]),
        |params| {
            params
                .get("query")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("Missing required parameter: query"))?;
            Ok(json!(ORDER_CANCELLATION_POLICY))
        },
    )
}
