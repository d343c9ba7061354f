use thiserror::Error;

/// Errors raised by the model adapter. None of them are caught inside the
/// adapter; the caller decides whether to surface or retry.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown message role: {0}")]
    UnknownRole(String),

    #[error("Unrecognized tool_choice. Expected a known tool name, a built-in tool type, \"any\", a bool or an object. Received: {0}")]
    InvalidToolChoice(String),

    #[error("Could not interpret tool call arguments for id {id}: {arguments}")]
    MalformedArguments {
        id: String,
        arguments: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("finish_reason {0}")]
    UnsupportedFinishReason(String),

    #[error("Request failed with status code {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("The provided function name '{0}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+")]
    InvalidToolName(String),

    #[error("Invalid tool definition: {0}")]
    InvalidToolDefinition(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
