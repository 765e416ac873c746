//! Core types for model invocations

use serde::{Deserialize, Serialize};

/// Message roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    /// Get the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

/// The minimal role-tagged message shape sent to the model.
///
/// Conversation history is flattened to this shape before an invocation;
/// `name` carries the tool name for tool-result messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Create a message with no name tag
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
        }
    }

    /// Create a tool-result message tagged with the tool name
    pub fn tool(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            name: Some(name.into()),
        }
    }
}

/// Tool definition for function calling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (used in API calls)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A single model invocation request
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    /// Model identifier (e.g., "gpt-4o")
    pub model: String,
    /// System prompt
    pub system_prompt: Option<String>,
    /// Conversation messages, oldest first
    pub messages: Vec<ChatMessage>,
    /// Available tools
    pub tools: Vec<ToolDefinition>,
}

impl ModelRequest {
    /// Create a request for a model with a system prompt
    pub fn new(model: impl Into<String>, system_prompt: Option<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt,
            messages: vec![],
            tools: vec![],
        }
    }

    /// Add a message to the request
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Add a tool to the request
    pub fn add_tool(&mut self, tool: ToolDefinition) {
        self.tools.push(tool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
        let role: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn test_chat_message_name_skipped_when_absent() {
        let msg = ChatMessage::new(Role::User, "hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("name").is_none());

        let msg = ChatMessage::tool("{}", "get_events");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["name"], "get_events");
    }

    #[test]
    fn test_request_push_preserves_order() {
        let mut req = ModelRequest::new("gpt-4o", None);
        req.push(ChatMessage::new(Role::User, "a"));
        req.push(ChatMessage::new(Role::Assistant, "b"));
        assert_eq!(req.messages[0].content, "a");
        assert_eq!(req.messages[1].content, "b");
    }
}
