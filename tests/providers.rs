use anyhow::Result;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

use helpdesk::agent::{AgentConfig, SupportAgent};
use helpdesk::errors::ModelError;
use helpdesk::providers::base::Usage;
use helpdesk::providers::chat_model::{BindOptions, ChatModel};
use helpdesk::providers::configs::{ModelConfig, PollinationsConfig};
use helpdesk::providers::pollinations::PollinationsClient;
use helpdesk::providers::types::message::Message;
use helpdesk::tools::{lookup_policy, Toolbox};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

fn chat_model(server: &ServerGuard) -> Result<ChatModel> {
    let config = PollinationsConfig {
        host: server.url(),
        timeout_secs: 5,
        max_retries: 0,
    };
    let transport = PollinationsClient::new(config)?;
    Ok(ChatModel::new(Arc::new(transport), ModelConfig::default()))
}

#[test]
fn test_plain_answer_end_to_end() -> Result<()> {
    let mut server = Server::new();
    let mock = server
        .mock("POST", COMPLETIONS_PATH)
        .match_body(Matcher::Json(json!({
            "messages": [{"role": "user", "content": "Can I cancel my order?"}],
            "private": true,
            "model": "openai",
            "web_search": false,
            "seed": 1
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-123",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "No, all sales are final."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            })
            .to_string(),
        )
        .create();

    let model = chat_model(&server)?;
    let response = model.generate(&[Message::user("Can I cancel my order?")], None)?;

    mock.assert();
    assert_eq!(response.content, "No, all sales are final.");
    assert!(response.tool_calls.is_empty());
    assert_eq!(response.usage, Some(Usage::new(Some(10), Some(5), Some(15))));
    Ok(())
}

#[test]
fn test_transport_error_end_to_end() -> Result<()> {
    let mut server = Server::new();
    let mock = server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(402)
        .with_body("{\"error\": \"payment required\"}")
        .create();

    let model = chat_model(&server)?;
    let result = model.generate(&[Message::user("hello")], None);

    mock.assert();
    match result {
        Err(ModelError::Transport { status, body }) => {
            assert_eq!(status, 402);
            assert_eq!(body, "{\"error\": \"payment required\"}");
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_bound_tools_are_sent() -> Result<()> {
    let mut server = Server::new();
    let mock = server
        .mock("POST", COMPLETIONS_PATH)
        .match_body(Matcher::PartialJson(json!({
            "tools": [{
                "type": "function",
                "function": {"name": "lookup_policy", "strict": true}
            }],
            "tool_choice": {"type": "function", "function": {"name": "lookup_policy"}},
            "model": "openai"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_123",
                            "type": "function",
                            "function": {
                                "name": "lookup_policy",
                                "arguments": "{\"query\":\"order cancellation\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": {"prompt_tokens": 20, "completion_tokens": 15, "total_tokens": 35}
            })
            .to_string(),
        )
        .create();

    let model = chat_model(&server)?;
    let bound = model.bind_tools(
        &[lookup_policy().into()],
        BindOptions::default().with_tool_choice("lookup_policy"),
    )?;
    let response = bound.invoke(&[Message::user("Can I cancel?")])?;

    mock.assert();
    assert_eq!(response.content, "");
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "call_123");
    assert_eq!(response.tool_calls[0].name, "lookup_policy");
    assert_eq!(
        response.tool_calls[0].arguments.get("query"),
        Some(&json!("order cancellation"))
    );
    Ok(())
}

#[test]
fn test_support_agent_conversation() -> Result<()> {
    let mut server = Server::new();
    let tool_turn = server
        .mock("POST", COMPLETIONS_PATH)
        .match_body(Matcher::Regex(
            r#"cancel my order\?"(,"role":"user")?\}\]"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "finish_reason": "tool_calls",
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "lookup_policy", "arguments": "{\"query\":\"cancel\"}"}
                        }]
                    }
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create();
    let answer_turn = server
        .mock("POST", COMPLETIONS_PATH)
        .match_body(Matcher::Regex(r#""tool_call_id":"call_1""#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "finish_reason": "stop",
                    "message": {"content": "Unfortunately all sales are final."}
                }],
                "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
            })
            .to_string(),
        )
        .expect(1)
        .create();

    let model = chat_model(&server)?;
    let agent = SupportAgent::new(
        &model,
        Toolbox::new(vec![lookup_policy()]),
        AgentConfig::default(),
    )?;
    let mut history = vec![Message::user("Am I allowed to cancel my order?")];

    let new_messages = agent.reply(&mut history)?;

    tool_turn.assert();
    answer_turn.assert();
    assert_eq!(new_messages.len(), 3);
    assert!(new_messages[1].content.contains("all sales are final"));
    assert_eq!(new_messages[2].content, "Unfortunately all sales are final.");
    assert_eq!(history.len(), 4);
    Ok(())
}
