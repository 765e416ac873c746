//! The pure projection from AI state to UI state

use crate::conversation::Conversation;
use crate::fragment::{FragmentView, UiFragment};
use crate::tools::{analysis, events};
use crate::turn::{AssistantContent, Turn};

/// Project a conversation's AI state to its UI state.
///
/// Pure and deterministic: `system` turns are filtered out, every remaining
/// turn maps to at most one fragment by role-specific (and for tool turns,
/// tool-name-specific) rules, and tool turns with an unknown name project to
/// no fragment. Used both for live rendering and for rehydrating UI state
/// from a persisted conversation.
pub fn project_ui_state(conversation: &Conversation) -> Vec<UiFragment> {
    conversation
        .turns()
        .iter()
        .filter(|turn| !matches!(turn, Turn::System { .. }))
        .enumerate()
        .filter_map(|(index, turn)| {
            let display = match turn {
                // Already filtered out; listed to keep the match exhaustive
                Turn::System { .. } => return None,
                Turn::User { content, .. } => FragmentView::UserMessage {
                    text: content.clone(),
                },
                Turn::Assistant { content, .. } => match content {
                    AssistantContent::Text { text } => FragmentView::AssistantMessage {
                        text: text.clone(),
                    },
                    AssistantContent::ToolCall { tool_name, .. } => FragmentView::ToolCall {
                        tool_name: tool_name.clone(),
                    },
                },
                Turn::Tool {
                    tool_name, result, ..
                } => render_tool_result(tool_name, result)?,
            };
            Some(UiFragment {
                id: format!("{}-{}", conversation.id(), index),
                display,
            })
        })
        .collect()
}

/// Tool-name-specific rendering rules; unknown names render nothing
fn render_tool_result(tool_name: &str, result: &serde_json::Value) -> Option<FragmentView> {
    match tool_name {
        analysis::NAME => serde_json::from_value(result.clone())
            .map(|props| FragmentView::AnalysisTools { props })
            .ok(),
        events::NAME => serde_json::from_value(result.clone())
            .map(|props| FragmentView::ExperimentEvents { props })
            .ok(),
        _ => None,
    }
}
