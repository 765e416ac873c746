//! Conversation state: the append-only AI-state turn log

use beaker_ai::{ChatMessage, Role};

use crate::turn::{next_id, AssistantContent, Turn};

/// The authoritative, append-only record of a conversation.
///
/// Mutated only by appending whole turns; existing turns are never edited,
/// removed, or reordered. Partial progress during streaming lives in the
/// [`crate::StreamingCursor`], never here.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    id: String,
    turns: Vec<Turn>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Create an empty conversation with a fresh id
    pub fn new() -> Self {
        Self::with_id(next_id())
    }

    /// Create an empty conversation with a known id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            turns: vec![],
        }
    }

    /// Rebuild a conversation from persisted turns
    pub fn from_turns(id: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            id: id.into(),
            turns,
        }
    }

    /// Get the conversation id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get all turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a turn.
    ///
    /// A tool turn pushed here must pair with an already-appended assistant
    /// turn carrying the same call id; unpaired tool turns are logged and
    /// appended anyway so a malformed persisted log still loads.
    pub fn push(&mut self, turn: Turn) {
        if let Turn::Tool { tool_call_id, .. } = &turn {
            let paired = self
                .turns
                .iter()
                .any(|t| matches!(t.tool_call(), Some((id, _, _)) if id == tool_call_id));
            if !paired {
                tracing::warn!("tool turn {} has no matching assistant tool call", tool_call_id);
            }
        }
        self.turns.push(turn);
    }

    /// Append the paired turns of one tool exchange: the assistant turn
    /// recording the call and the tool turn recording its result.
    ///
    /// Returns clones of the two appended turns.
    pub fn push_tool_exchange(
        &mut self,
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: serde_json::Value,
        result: serde_json::Value,
    ) -> (Turn, Turn) {
        let tool_call_id = tool_call_id.into();
        let tool_name = tool_name.into();
        let call_turn = Turn::assistant_tool_call(tool_call_id.clone(), tool_name.clone(), arguments);
        let result_turn = Turn::tool_result(tool_call_id, tool_name, result);
        self.push(call_turn.clone());
        self.push(result_turn.clone());
        (call_turn, result_turn)
    }

    /// Flatten the turn log to the minimal role-tagged shape expected by the
    /// model service
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .map(|turn| match turn {
                Turn::User { content, .. } => ChatMessage::new(Role::User, content),
                Turn::System { content, .. } => ChatMessage::new(Role::System, content),
                Turn::Assistant { content, .. } => match content {
                    AssistantContent::Text { text } => ChatMessage::new(Role::Assistant, text),
                    AssistantContent::ToolCall {
                        tool_name,
                        arguments,
                        ..
                    } => ChatMessage {
                        role: Role::Assistant,
                        content: arguments.to_string(),
                        name: Some(tool_name.clone()),
                    },
                },
                Turn::Tool {
                    tool_name, result, ..
                } => ChatMessage::tool(result.to_string(), tool_name),
            })
            .collect()
    }
}
