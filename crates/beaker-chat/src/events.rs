//! Session event types

use serde::{Deserialize, Serialize};

use crate::fragment::UiFragment;
use crate::turn::Turn;

/// Events broadcast to the presentation layer during a session.
///
/// Fragment events carry render-ready view models; turn events mirror the
/// whole-turn commits to AI state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A model invocation started
    InvocationStart,

    /// The live fragment changed (streaming text or a tool loading state)
    FragmentUpdate { fragment: UiFragment },

    /// A fragment reached its final form
    FragmentDone { fragment: UiFragment },

    /// A whole turn was appended to AI state
    TurnCommitted { turn: Turn },

    /// Tool execution started
    ToolExecutionStart {
        tool_call_id: String,
        tool_name: String,
        arguments: serde_json::Value,
    },

    /// Tool execution completed
    ToolExecutionEnd {
        tool_call_id: String,
        tool_name: String,
        is_error: bool,
    },

    /// The invocation finished (successfully or not)
    InvocationEnd,

    /// Error occurred
    Error { message: String },
}

impl SessionEvent {
    /// Check if this is a terminal event
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::InvocationEnd | SessionEvent::Error { .. }
        )
    }
}
