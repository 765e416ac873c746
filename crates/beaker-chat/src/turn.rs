//! Turn types: the role-tagged entries of a conversation's AI state

use beaker_ai::Role;
use serde::{Deserialize, Serialize};

/// Generate a fresh unique id for a turn or tool call
pub fn next_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Content of an assistant turn: plain text or a recorded tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantContent {
    /// Text response
    Text { text: String },
    /// Tool call request
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        arguments: serde_json::Value,
    },
}

/// One entry in a conversation's AI state.
///
/// Turns are immutable once appended; ordering is append-only and
/// significant. A `Tool` turn always pairs with a preceding `Assistant` turn
/// carrying the matching `tool_call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    /// User message
    User { id: String, content: String },
    /// Assistant response
    Assistant { id: String, content: AssistantContent },
    /// System note (never projected to UI state)
    System { id: String, content: String },
    /// Tool result
    Tool {
        id: String,
        tool_call_id: String,
        tool_name: String,
        result: serde_json::Value,
    },
}

impl Turn {
    /// Create a user turn with a fresh id
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            id: next_id(),
            content: content.into(),
        }
    }

    /// Create a system turn with a fresh id
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            id: next_id(),
            content: content.into(),
        }
    }

    /// Create a text assistant turn with a fresh id
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::assistant_text_with_id(next_id(), text)
    }

    /// Create a text assistant turn reusing an id minted earlier
    /// (the streaming cursor's id, so the live fragment and the committed
    /// turn line up)
    pub fn assistant_text_with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Assistant {
            id: id.into(),
            content: AssistantContent::Text { text: text.into() },
        }
    }

    /// Create an assistant turn recording a tool call
    pub fn assistant_tool_call(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::Assistant {
            id: next_id(),
            content: AssistantContent::ToolCall {
                tool_call_id: tool_call_id.into(),
                tool_name: tool_name.into(),
                arguments,
            },
        }
    }

    /// Create a tool result turn
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        result: serde_json::Value,
    ) -> Self {
        Self::Tool {
            id: next_id(),
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            result,
        }
    }

    /// Get the turn id
    pub fn id(&self) -> &str {
        match self {
            Self::User { id, .. }
            | Self::Assistant { id, .. }
            | Self::System { id, .. }
            | Self::Tool { id, .. } => id,
        }
    }

    /// Get the role of this turn
    pub fn role(&self) -> Role {
        match self {
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::System { .. } => Role::System,
            Self::Tool { .. } => Role::Tool,
        }
    }

    /// Get the tool call recorded in this turn, if it is an assistant
    /// tool-call turn
    pub fn tool_call(&self) -> Option<(&str, &str, &serde_json::Value)> {
        match self {
            Self::Assistant {
                content:
                    AssistantContent::ToolCall {
                        tool_call_id,
                        tool_name,
                        arguments,
                    },
                ..
            } => Some((tool_call_id.as_str(), tool_name.as_str(), arguments)),
            _ => None,
        }
    }

    /// Render the turn's content as text (structured payloads are
    /// JSON-serialized)
    pub fn text(&self) -> String {
        match self {
            Self::User { content, .. } | Self::System { content, .. } => content.clone(),
            Self::Assistant { content, .. } => match content {
                AssistantContent::Text { text } => text.clone(),
                AssistantContent::ToolCall { arguments, .. } => arguments.to_string(),
            },
            Self::Tool { result, .. } => result.to_string(),
        }
    }
}
